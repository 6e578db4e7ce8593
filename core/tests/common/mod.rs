//! Per-test mock server startup.

#![allow(dead_code)]

use bitly_core::Client;
use mock_server::Router;

pub const TOKEN: &str = "123";

/// Serve `router` on a random local port from a background thread and return
/// its base URL. Each test gets its own server, so no state is shared.
pub fn spawn(router: Router) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, router).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Client with token `TOKEN` pointed at a fresh server for `router`.
pub fn client_for(router: Router) -> Client {
    Client::builder(TOKEN)
        .base_url(&spawn(router))
        .build()
        .unwrap()
}

/// Bitly envelope around `data`, as a JSON string.
pub fn json_res(data: &str, code: u16, txt: &str) -> String {
    let data: serde_json::Value = serde_json::from_str(data).unwrap();
    mock_server::envelope(data, code, txt).to_string()
}
