use crate::util::api_request;

pub async fn run(base_url: &str, raw: bool) -> i32 {
    api_request(
        base_url,
        reqwest::Method::GET,
        "/.well-known/agent.json",
        None,
        raw,
    )
    .await
}
