use std::time::Duration;

use anyhow::{Result, bail};
use futures_util::{SinkExt, Stream, StreamExt};
use peet::{
    api::{self, ws::Response},
    dispatch::{Trigger, invoke},
    event::Transferred,
    test_utils::{AUTHORITY, authority_ctx, free_port, new_test_env},
};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

async fn next_response<S>(stream: &mut S) -> Result<Response>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let message = match timeout(Duration::from_secs(5), stream.next()).await? {
            Some(message) => message?,
            None => bail!("Stream closed"),
        };
        if let Message::Text(text) = message {
            return Ok(serde_json::from_str(text.as_str())?);
        }
    }
}

#[tokio::test]
async fn test_websocket_streams_transfers() -> Result<()> {
    let (mut env, _temp_dir) = new_test_env().await?;
    env.config.api_port = free_port()?;
    let cancel_token = env.cancel_token.clone();
    let ledger = env.ledger.clone();
    let handle = api::run(env.clone()).await?;

    let url = format!("ws://127.0.0.1:{}/ws", env.config.api_port);
    let mut attempts = 0;
    let (mut ws_stream, _) = loop {
        match connect_async(url.as_str()).await {
            Ok(connection) => break connection,
            Err(_) if attempts < 50 => {
                attempts += 1;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Err(e) => return Err(e.into()),
        }
    };

    ws_stream
        .send(Message::Ping(vec![1, 2, 3].into()))
        .await?;
    let received = timeout(Duration::from_secs(5), ws_stream.next())
        .await?
        .expect("stream open")?;
    assert_eq!(received, Message::Pong(vec![1, 2, 3].into()));

    {
        let mut ledger = ledger.lock().await;
        invoke(
            &mut *ledger,
            &authority_ctx(),
            Trigger::Application,
            "deploy",
            &[],
        )
        .await?;
    }
    assert_eq!(
        next_response(&mut ws_stream).await?,
        Response::Event {
            event: Transferred {
                from: None,
                to: AUTHORITY,
                amount: 1_000_000_000_000,
            }
        }
    );

    ws_stream
        .send(Message::Text("subscribe".to_string().into()))
        .await?;
    assert!(matches!(
        next_response(&mut ws_stream).await?,
        Response::Error { .. }
    ));

    ws_stream.close(None).await?;
    cancel_token.cancel();
    timeout(Duration::from_secs(15), handle).await??;
    Ok(())
}
