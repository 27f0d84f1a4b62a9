#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zenbrain_backend::run().await
}
