use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Semaphore;

use crate::logging;

/// 限制並發請求數，避免對文件庫造成瞬間壓力
static SEMAPHORE: Lazy<Semaphore> = Lazy::new(|| Semaphore::new(4));

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

const USER_AGENT: &str = concat!("wiki_cloner/", env!("CARGO_PKG_VERSION"));

/// HTTP 請求失敗時的最大重試次數。
const MAX_RETRIES: usize = 2;

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .brotli(true)
            .gzip(true)
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and deserializes the JSON response into the specified type.
pub async fn get_json<RES: DeserializeOwned>(
    url: &str,
    headers: Option<header::HeaderMap>,
) -> Result<RES> {
    let res = send(Method::GET, url, headers, None::<fn(_) -> _>).await?;

    read_json(url, res).await
}

/// Performs an HTTP POST request with JSON request and response, and specified headers.
pub async fn post_use_json<REQ, RES>(
    url: &str,
    headers: Option<header::HeaderMap>,
    req: Option<&REQ>,
) -> Result<RES>
where
    REQ: Serialize,
    RES: DeserializeOwned,
{
    let res = send(
        Method::POST,
        url,
        headers,
        Some(|rb: RequestBuilder| {
            if let Some(r) = req {
                rb.json(r)
            } else {
                rb
            }
        }),
    )
    .await?;

    read_json(url, res).await
}

/// 讀取回應內容並反序列化，非 2xx 的回應連同內文一起回報
async fn read_json<RES: DeserializeOwned>(url: &str, res: Response) -> Result<RES> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| anyhow!("Error reading response body: {:?}", e))?;

    if !status.is_success() {
        return Err(anyhow!("{} returned HTTP {}: {}", url, status, body));
    }

    serde_json::from_str(&body)
        .map_err(|e| anyhow!("Error parsing response JSON({}): {:?}", &body, e))
}

/// Sends an HTTP request using the specified method, URL, headers, and body with retries on failure.
///
/// This function will attempt to send the request up to MAX_RETRIES times. If a request
/// attempt fails, it logs the error and retries the request after a delay. The delay
/// increases with each attempt.
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb = client.request(method, url);
    let mut last_error = String::new();

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    for attempt in 1..=MAX_RETRIES {
        let msg = format!("Attempt {} to send {}", attempt, visit_log);
        let rb_clone = rb
            .try_clone()
            .ok_or_else(|| anyhow!("Failed to clone RequestBuilder"))?;
        let permit = SEMAPHORE.acquire().await;
        let start = Instant::now();
        let res = rb_clone.send().await;
        let elapsed = start.elapsed().as_millis();
        drop(permit);

        match res {
            Ok(response) => {
                logging::debug_file_async(format!("{} {} ms", msg, elapsed));
                return Ok(response);
            }
            Err(why) => {
                last_error = format!("{:?}", why);
                logging::error_file_async(format!(
                    "{} failed because {:?}. {} ms",
                    msg, why, elapsed
                ));

                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt as u32))).await;

                    continue;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to send request to {} after {} attempts; last error: {}",
        url,
        MAX_RETRIES,
        last_error
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct HttpBinIp {
        origin: String,
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_json() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 test_get_json".to_string());

        match get_json::<HttpBinIp>("https://httpbin.org/ip", None).await {
            Ok(res) => {
                logging::debug_file_async(format!("origin: {}", res.origin));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to get_json because {:?}", why));
            }
        }

        logging::debug_file_async("結束 test_get_json".to_string());
    }
}
