use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    sharewatch::run().await
}
