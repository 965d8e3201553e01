use dotenvy::dotenv;
use std::env;

const DEFAULT_PORT: u16 = 8080;

pub struct Config {
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenv().is_ok();

        let port = env::var("PORT")
            .map(|p| p.parse().expect("PORT must be a valid u16 number"))
            .unwrap_or(DEFAULT_PORT);

        Self { port }
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
