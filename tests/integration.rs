use redis::aio::MultiplexedConnection;
use rodis::config::Config;
use rodis::server;
use tokio::time::{sleep, Duration};

/// Spawns a server on `port` over a scratch directory and connects to it.
async fn start_server(port: u16, require_pass: &str) -> MultiplexedConnection {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.listen = format!("127.0.0.1:{}", port);
    config.leveldb_path = dir.path().join("data");
    config.require_pass = require_pass.to_string();

    tokio::spawn(async move {
        // The tempdir lives as long as the server task.
        let _dir = dir;
        let _ = server::run(config, std::future::pending::<()>()).await;
    });

    let client = redis::Client::open(format!("redis://127.0.0.1:{}/", port)).unwrap();
    for _ in 0..50 {
        if let Ok(connection) = client.get_multiplexed_async_connection().await {
            return connection;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("server on port {} did not come up", port);
}

#[tokio::test]
async fn select_and_ping() {
    let mut con = start_server(7311, "").await;

    let err = redis::cmd("SELECT")
        .arg(16)
        .query_async::<_, String>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("DB index is out of range"));

    let ok: String = redis::cmd("SELECT").arg(0).query_async(&mut con).await.unwrap();
    assert_eq!(ok, "OK");

    let pong: String = redis::cmd("PING").query_async(&mut con).await.unwrap();
    assert_eq!(pong, "PONG");
}

#[tokio::test]
async fn databases_are_isolated() {
    let mut con = start_server(7312, "").await;

    let _: String = redis::cmd("SET")
        .arg("k")
        .arg("zero")
        .query_async(&mut con)
        .await
        .unwrap();

    let _: String = redis::cmd("SELECT").arg(1).query_async(&mut con).await.unwrap();
    let missing: Option<String> = redis::cmd("GET").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(missing, None);

    let _: String = redis::cmd("SELECT").arg(0).query_async(&mut con).await.unwrap();
    let value: Option<String> = redis::cmd("GET").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(value, Some("zero".to_string()));
}

#[tokio::test]
async fn auth_gate() {
    let mut con = start_server(7313, "sesame").await;

    let err = redis::cmd("GET")
        .arg("k")
        .query_async::<_, Option<String>>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("NOAUTH Authentication required"));

    let err = redis::cmd("AUTH")
        .arg("wrong")
        .query_async::<_, String>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid password"));

    let ok: String = redis::cmd("AUTH")
        .arg("sesame")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(ok, "OK");

    let missing: Option<String> = redis::cmd("GET").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn type_transitions_require_del() {
    let mut con = start_server(7314, "").await;

    let ok: String = redis::cmd("SET")
        .arg("a")
        .arg("foobar")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(ok, "OK");

    let err = redis::cmd("HSET")
        .arg("a")
        .arg("f")
        .arg("v")
        .query_async::<_, i64>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("WRONGTYPE"));

    let deleted: i64 = redis::cmd("DEL").arg("a").query_async(&mut con).await.unwrap();
    assert_eq!(deleted, 1);

    let added: i64 = redis::cmd("HSET")
        .arg("a")
        .arg("f")
        .arg("v")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(added, 1);

    let tipe: String = redis::cmd("TYPE").arg("a").query_async(&mut con).await.unwrap();
    assert_eq!(tipe, "hash");
}

#[tokio::test]
async fn string_round_trip() {
    let mut con = start_server(7315, "").await;

    let _: String = redis::cmd("SET")
        .arg("k")
        .arg(&b"binary \x00\x01 safe"[..])
        .query_async(&mut con)
        .await
        .unwrap();
    let value: Vec<u8> = redis::cmd("GET").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(value, b"binary \x00\x01 safe");

    let length: i64 = redis::cmd("APPEND")
        .arg("counter")
        .arg("10")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(length, 2);

    let n: i64 = redis::cmd("INCR").arg("counter").query_async(&mut con).await.unwrap();
    assert_eq!(n, 11);

    let old: Option<String> = redis::cmd("GETSET")
        .arg("counter")
        .arg("0")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(old, Some("11".to_string()));
}

#[tokio::test]
async fn hash_round_trip() {
    let mut con = start_server(7316, "").await;

    let added: i64 = redis::cmd("HSET")
        .arg("h")
        .arg("f")
        .arg("v")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(added, 1);

    let value: Option<String> = redis::cmd("HGET")
        .arg("h")
        .arg("f")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(value, Some("v".to_string()));

    let removed: i64 = redis::cmd("HDEL")
        .arg("h")
        .arg("f")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let exists: i64 = redis::cmd("HEXISTS")
        .arg("h")
        .arg("f")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(exists, 0);

    let length: i64 = redis::cmd("HLEN").arg("h").query_async(&mut con).await.unwrap();
    assert_eq!(length, 0);
}

#[tokio::test]
async fn list_ring_scenario() {
    let mut con = start_server(7317, "").await;

    let n: i64 = redis::cmd("RPUSH")
        .arg("k")
        .arg(1)
        .arg(2)
        .arg(3)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(n, 3);

    let n: i64 = redis::cmd("LPUSH").arg("k").arg(0).query_async(&mut con).await.unwrap();
    assert_eq!(n, 4);

    let range: Vec<String> = redis::cmd("LRANGE")
        .arg("k")
        .arg(0)
        .arg(-1)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(range, vec!["0", "1", "2", "3"]);

    let n: i64 = redis::cmd("LINSERT")
        .arg("k")
        .arg("BEFORE")
        .arg("2")
        .arg("x")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(n, 5);

    let range: Vec<String> = redis::cmd("LRANGE")
        .arg("k")
        .arg(0)
        .arg(-1)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(range, vec!["0", "1", "x", "2", "3"]);

    let removed: i64 = redis::cmd("LREM")
        .arg("k")
        .arg(-1)
        .arg("x")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let range: Vec<String> = redis::cmd("LRANGE")
        .arg("k")
        .arg(0)
        .arg(-1)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(range, vec!["0", "1", "2", "3"]);
}

#[tokio::test]
async fn sorted_set_ranking_scenario() {
    let mut con = start_server(7318, "").await;

    let added: i64 = redis::cmd("ZADD")
        .arg("s")
        .arg(1)
        .arg("a")
        .arg(2)
        .arg("b")
        .arg(3)
        .arg("c")
        .arg(2)
        .arg("d")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(added, 4);

    let range: Vec<String> = redis::cmd("ZRANGE")
        .arg("s")
        .arg(0)
        .arg(-1)
        .arg("WITHSCORES")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(range, vec!["a", "1", "b", "2", "d", "2", "c", "3"]);

    let rank: i64 = redis::cmd("ZRANK").arg("s").arg("c").query_async(&mut con).await.unwrap();
    assert_eq!(rank, 3);

    let removed: i64 = redis::cmd("ZREM").arg("s").arg("b").query_async(&mut con).await.unwrap();
    assert_eq!(removed, 1);

    let range: Vec<String> = redis::cmd("ZRANGE")
        .arg("s")
        .arg(0)
        .arg(-1)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(range, vec!["a", "d", "c"]);

    let range: Vec<String> = redis::cmd("ZRANGEBYSCORE")
        .arg("s")
        .arg("(1")
        .arg(3)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(range, vec!["d", "c"]);
}

#[tokio::test]
async fn set_membership() {
    let mut con = start_server(7319, "").await;

    let added: i64 = redis::cmd("SADD")
        .arg("k")
        .arg("a")
        .arg("b")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(added, 2);

    let yes: i64 = redis::cmd("SISMEMBER")
        .arg("k")
        .arg("a")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(yes, 1);

    let no: i64 = redis::cmd("SISMEMBER")
        .arg("k")
        .arg("c")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(no, 0);

    let card: i64 = redis::cmd("SCARD").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(card, 2);

    let diff: Vec<String> = redis::cmd("SDIFF")
        .arg("k")
        .arg("other")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(diff, vec!["a", "b"]);
}

#[tokio::test]
async fn bitcount_scenario() {
    let mut con = start_server(7320, "").await;

    let _: String = redis::cmd("SET")
        .arg("k")
        .arg("foobar")
        .query_async(&mut con)
        .await
        .unwrap();

    let count: i64 = redis::cmd("BITCOUNT").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(count, 26);

    let count: i64 = redis::cmd("BITCOUNT")
        .arg("k")
        .arg(1)
        .arg(5)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(count, 22);
}

#[tokio::test]
async fn expiry_on_access() {
    let mut con = start_server(7321, "").await;

    let _: String = redis::cmd("SET").arg("k").arg("v").query_async(&mut con).await.unwrap();

    let set: i64 = redis::cmd("PEXPIRE")
        .arg("k")
        .arg(1)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(set, 1);

    // Deadlines round down to whole seconds, so wait out a full second.
    sleep(Duration::from_millis(1100)).await;

    let exists: i64 = redis::cmd("EXISTS").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(exists, 0);

    let value: Option<String> = redis::cmd("GET").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(value, None);

    let tipe: String = redis::cmd("TYPE").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(tipe, "none");
}

#[tokio::test]
async fn ttl_reporting() {
    let mut con = start_server(7322, "").await;

    let ttl: i64 = redis::cmd("TTL").arg("missing").query_async(&mut con).await.unwrap();
    assert_eq!(ttl, -1);

    let _: String = redis::cmd("SET").arg("k").arg("v").query_async(&mut con).await.unwrap();
    let ttl: i64 = redis::cmd("TTL").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(ttl, -1);

    let set: i64 = redis::cmd("EXPIRE")
        .arg("k")
        .arg(100)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(set, 1);

    let ttl: i64 = redis::cmd("TTL").arg("k").query_async(&mut con).await.unwrap();
    assert!((99..=100).contains(&ttl));

    // Unconditional SET drops the deadline again.
    let _: String = redis::cmd("SET").arg("k").arg("v2").query_async(&mut con).await.unwrap();
    let ttl: i64 = redis::cmd("TTL").arg("k").query_async(&mut con).await.unwrap();
    assert_eq!(ttl, -1);
}

#[tokio::test]
async fn unknown_and_malformed_commands() {
    let mut con = start_server(7323, "").await;

    let err = redis::cmd("FROBNICATE")
        .arg("x")
        .query_async::<_, String>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown command"));

    let err = redis::cmd("GET")
        .query_async::<_, Option<String>>(&mut con)
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("wrong number of arguments for 'get' command"));
}
