mod board;
mod data;
mod report;
mod server;
mod solver;
#[cfg(test)]
mod testutil;
mod validate;
mod variables;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    server::run_server().await;
}
