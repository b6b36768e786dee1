#[tokio::main]
async fn main() -> anyhow::Result<()> {
    word_progress_backend::run().await
}
