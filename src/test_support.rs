// Fixtures shared by the unit and route tests

use axum::{Router, http::header, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use crate::{AppState, config::Settings, models::Car};

fn car(id: i64, make: &str, model: &str, year: i32, price: f64, mileage: f64) -> Car {
    let slug = format!("{}-{}", make, model).to_lowercase();
    Car {
        id,
        make: make.to_string(),
        model: model.to_string(),
        year,
        price,
        mileage,
        images: vec![
            format!("https://img.example/{}-front.jpg", slug),
            format!("https://img.example/{}-side.jpg", slug),
        ],
        specifications: None,
        description: None,
    }
}

pub fn scenario_cars() -> Vec<Car> {
    let mut cars = vec![
        car(1, "BMW", "X5", 2020, 50000.0, 10000.0),
        car(2, "Audi", "A4", 2019, 40000.0, 20000.0),
        car(3, "BMW", "3-Series", 2021, 55000.0, 5000.0),
        car(4, "Audi", "Q5", 2022, 60000.0, 3000.0),
        car(5, "BMW", "X3", 2018, 35000.0, 25000.0),
        car(6, "Audi", "A6", 2020, 45000.0, 15000.0),
        car(7, "BMW", "Z4", 2023, 70000.0, 2000.0),
    ];
    let z4 = &mut cars[6];
    z4.specifications = Some(
        [("Engine", "3.0L I6"), ("Transmission", "Automatic")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    z4.description = Some("Two-seat roadster with a folding soft top.".to_string());
    cars
}

pub fn test_settings(feed_url: String) -> Settings {
    Settings {
        server_address: "127.0.0.1:0".to_string(),
        feed_url,
        items_per_page: 3,
        fetch_timeout_secs: 5,
    }
}

pub fn test_state(feed_url: String) -> AppState {
    AppState {
        settings: Arc::new(test_settings(feed_url)),
        http_client: Arc::new(reqwest::Client::new()),
    }
}

pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}

// Serves `body` as the car feed and returns its URL
pub async fn spawn_feed(body: String) -> String {
    let router = Router::new().route(
        "/cars.json",
        get(move || {
            let body = body.clone();
            async move { ([(header::CONTENT_TYPE, "application/json")], body) }
        }),
    );
    let addr = serve(router).await;
    format!("http://{}/cars.json", addr)
}

pub async fn spawn_scenario_feed() -> String {
    let body = serde_json::to_string(&scenario_cars()).expect("serialize scenario cars");
    spawn_feed(body).await
}

// A URL nothing listens on
pub async fn dead_feed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway address");
    drop(listener);
    format!("http://{}/cars.json", addr)
}
