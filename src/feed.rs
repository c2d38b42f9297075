// Fetching the car feed (a JSON array of cars at a fixed URL)

use anyhow::{Context, Result};
use reqwest::Client;

use crate::models::Car;

// A failed fetch is logged and treated as "no cars"
pub async fn fetch_cars(client: &Client, url: &str) -> Vec<Car> {
    match try_fetch_cars(client, url).await {
        Ok(cars) => {
            tracing::info!(count = cars.len(), "Fetched car feed");
            cars
        }
        Err(e) => {
            tracing::error!("Failed to fetch car feed from {}: {:?}", url, e);
            Vec::new()
        }
    }
}

async fn try_fetch_cars(client: &Client, url: &str) -> Result<Vec<Car>> {
    tracing::debug!(url, "Requesting car feed");
    let cars = client
        .get(url)
        .send()
        .await
        .context("Failed to reach car feed")?
        .error_for_status()
        .context("Car feed returned an error status")?
        .json::<Vec<Car>>()
        .await
        .context("Failed to parse car feed JSON")?;
    Ok(cars)
}

pub fn parse_car_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

// Looks a car up by the raw path segment; anything that is not an integer never matches
pub async fn find_car(client: &Client, url: &str, raw_id: &str) -> Option<Car> {
    let Some(id) = parse_car_id(raw_id) else {
        tracing::info!(raw_id, "Car id is not an integer");
        return None;
    };
    let car = fetch_cars(client, url)
        .await
        .into_iter()
        .find(|car| car.id == id);
    if car.is_none() {
        tracing::info!(id, "No car with this id in the feed");
    }
    car
}
