use lilo_client::{LiloClient, MoodQuery, config::Config, http_client::ReqwestLiloClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: reads LILO_BASE_URL (and optionally LILO_API_TOKEN) from env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestLiloClient::from_config(&cfg);
    let query = match std::env::args().nth(1) {
        Some(user) => MoodQuery::for_user(user),
        None => MoodQuery::default(),
    };
    let items = client.list_moods(&query).await?;
    println!("{} mood items", items.len());
    for item in items.iter().take(5) {
        println!("{item}");
    }
    Ok(())
}
