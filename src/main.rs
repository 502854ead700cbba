#[tokio::main]
async fn main() -> anyhow::Result<()> {
    focusbeats_lib::run().await
}
