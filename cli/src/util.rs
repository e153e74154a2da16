use serde_json::{Value, json};

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn render(value: &Value, raw: bool) -> String {
    let rendered = if raw {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

fn print_cli_error(kind: &str, message: String, docs_hint: Option<&str>) {
    let mut err = json!({
        "error": kind,
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", render(&err, false));
}

/// Map an HTTP status onto the CLI exit code.
pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Execute a request against the agent, print the JSON response, and return
/// a structured exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    base_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<&Value>,
    raw: bool,
) -> i32 {
    let url = match reqwest::Url::parse(&format!("{}{path}", base_url.trim_end_matches('/'))) {
        Ok(url) => url,
        Err(e) => {
            print_cli_error("cli_error", format!("Invalid URL: {base_url}{path}: {e}"), None);
            return 4;
        }
    };

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            print_cli_error(
                "connection_error",
                format!("{e}"),
                Some("Is the agent running? Check EXERCISE_AGENT_URL."),
            );
            return 3;
        }
    };

    let exit_code = exit_code_for_status(resp.status().as_u16());
    let resp_body: Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    let formatted = render(&resp_body, raw);
    if exit_code == 0 {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }

    exit_code
}
