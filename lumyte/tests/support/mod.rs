//! An in-process broker speaking just enough RESP for the tests: the
//! command surface the pipeline uses, over a real Unix socket.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lumyte::broker::resp::Reply;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Default)]
struct State {
    strings: HashMap<String, Vec<u8>>,
    lists: HashMap<String, Vec<Vec<u8>>>,
    subscribers: Vec<UnixStream>,
    /// Longest any list has ever been.
    high_water: usize,
}

pub struct MiniBroker {
    path: PathBuf,
    state: Arc<Mutex<State>>,
}

impl MiniBroker {
    pub fn start() -> Self {
        let path = std::env::temp_dir().join(format!(
            "lumyte-test-broker-{}-{}.sock",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();
        let state = Arc::new(Mutex::new(State::default()));

        let accept_state = Arc::clone(&state);
        std::thread::spawn(move || {
            for conn in listener.incoming() {
                let Ok(conn) = conn else { break };
                let conn_state = Arc::clone(&accept_state);
                std::thread::spawn(move || serve(conn, conn_state));
            }
        });

        Self { path, state }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn llen(&self, key: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .lists
            .get(key)
            .map_or(0, Vec::len)
    }

    pub fn high_water(&self) -> usize {
        self.state.lock().unwrap().high_water
    }

    pub fn get_string(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().strings.get(key).cloned()
    }

    pub fn lpop(&self, key: &str) -> Option<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        let list = state.lists.get_mut(key)?;
        if list.is_empty() {
            None
        } else {
            Some(list.remove(0))
        }
    }

    /// Push a message to every subscriber, as the broker would.
    pub fn publish(&self, channel: &str, payload: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.subscribers.retain_mut(|sub| {
            write_message(sub, channel, payload).is_ok()
        });
    }
}

impl Drop for MiniBroker {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn serve(conn: UnixStream, state: Arc<Mutex<State>>) {
    let Ok(read_half) = conn.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut writer = conn;

    loop {
        let Ok(request) = Reply::read_from(&mut reader) else {
            return;
        };
        let Reply::Array(items) = request else { return };
        let args: Vec<Vec<u8>> = items
            .into_iter()
            .filter_map(|item| match item {
                Reply::Bulk(data) => Some(data),
                _ => None,
            })
            .collect();
        let Some(cmd) = args.first() else { return };

        let result = match cmd.to_ascii_uppercase().as_slice() {
            b"GET" => cmd_get(&mut writer, &state, &args),
            b"SET" => cmd_set(&mut writer, &state, &args),
            b"DEL" => cmd_del(&mut writer, &state, &args),
            b"RPUSH" => cmd_rpush(&mut writer, &state, &args),
            b"LLEN" => cmd_llen(&mut writer, &state, &args),
            b"BLPOP" => cmd_blpop(&mut writer, &state, &args),
            b"PUBLISH" => cmd_publish(&mut writer, &state, &args),
            b"SUBSCRIBE" => {
                let ok = cmd_subscribe(&mut writer, &state, &args);
                if ok.is_ok() {
                    // The connection now belongs to the pub/sub fan-out.
                    return;
                }
                ok
            }
            _ => writer.write_all(b"-ERR unknown command\r\n"),
        };
        if result.is_err() {
            return;
        }
    }
}

fn key_of(args: &[Vec<u8>]) -> String {
    String::from_utf8_lossy(&args[1]).into_owned()
}

fn cmd_get(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let value = state.lock().unwrap().strings.get(&key_of(args)).cloned();
    match value {
        Some(value) => write_bulk(w, &value),
        None => w.write_all(b"$-1\r\n"),
    }
}

fn cmd_set(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    state
        .lock()
        .unwrap()
        .strings
        .insert(key_of(args), args[2].clone());
    w.write_all(b"+OK\r\n")
}

fn cmd_del(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let key = key_of(args);
    let mut st = state.lock().unwrap();
    let removed = st.strings.remove(&key).is_some() | st.lists.remove(&key).is_some();
    write_int(w, i64::from(removed))
}

fn cmd_rpush(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let mut st = state.lock().unwrap();
    let list = st.lists.entry(key_of(args)).or_default();
    list.push(args[2].clone());
    let len = list.len();
    st.high_water = st.high_water.max(len);
    write_int(w, len as i64)
}

fn cmd_llen(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let len = state.lock().unwrap().lists.get(&key_of(args)).map_or(0, Vec::len);
    write_int(w, len as i64)
}

fn cmd_blpop(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let key = key_of(args);
    let timeout_secs: u64 = String::from_utf8_lossy(&args[2]).parse().unwrap_or(1);
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);

    loop {
        {
            let mut st = state.lock().unwrap();
            if let Some(list) = st.lists.get_mut(&key) {
                if !list.is_empty() {
                    let value = list.remove(0);
                    write!(w, "*2\r\n")?;
                    write_bulk(w, key.as_bytes())?;
                    return write_bulk(w, &value);
                }
            }
        }
        if Instant::now() >= deadline {
            return w.write_all(b"*-1\r\n");
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

fn cmd_publish(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let channel = key_of(args);
    let mut st = state.lock().unwrap();
    st.subscribers
        .retain_mut(|sub| write_message(sub, &channel, &args[2]).is_ok());
    let count = st.subscribers.len();
    write_int(w, count as i64)
}

fn cmd_subscribe(
    w: &mut UnixStream,
    state: &Mutex<State>,
    args: &[Vec<u8>],
) -> std::io::Result<()> {
    let channel = key_of(args);
    // Register before acking so a publish that lands right after the
    // client sees the ack cannot be lost.
    let registered = w.try_clone()?;
    state.lock().unwrap().subscribers.push(registered);

    write!(w, "*3\r\n")?;
    write_bulk(w, b"subscribe")?;
    write_bulk(w, channel.as_bytes())?;
    write_int(w, 1)?;
    Ok(())
}

fn write_bulk(w: &mut UnixStream, data: &[u8]) -> std::io::Result<()> {
    write!(w, "${}\r\n", data.len())?;
    w.write_all(data)?;
    w.write_all(b"\r\n")
}

fn write_int(w: &mut UnixStream, value: i64) -> std::io::Result<()> {
    write!(w, ":{value}\r\n")
}

fn write_message(w: &mut UnixStream, channel: &str, payload: &[u8]) -> std::io::Result<()> {
    write!(w, "*3\r\n")?;
    write_bulk(w, b"message")?;
    write_bulk(w, channel.as_bytes())?;
    write_bulk(w, payload)
}
