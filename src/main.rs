#[tokio::main]
async fn main() {
    ojs_certify::start_server().await;
}
