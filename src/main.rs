#[tokio::main]
async fn main() {
    helpdesk_backend::run().await;
}
