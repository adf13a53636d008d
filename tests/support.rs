use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

/// How a fake worker answers.
#[derive(Debug, Clone)]
pub struct WorkerBehavior {
    /// Reported in the start reply; 0 means the run was refused.
    pub run_id: i64,
    /// Result polls answered with 404 before the result is served.
    pub pending_polls: usize,
    /// Result body served once ready.
    pub result: String,
}

impl WorkerBehavior {
    #[must_use]
    pub fn ready(result: &str) -> Self {
        Self {
            run_id: 1,
            pending_polls: 0,
            result: result.to_owned(),
        }
    }
}

#[derive(Debug, Default)]
pub struct WorkerCounters {
    pub starts: AtomicUsize,
    pub polls: AtomicUsize,
}

pub struct WorkerHandle {
    pub endpoint: String,
    pub counters: Arc<WorkerCounters>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    #[must_use]
    pub fn starts(&self) -> usize {
        self.counters.starts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn polls(&self) -> usize {
        self.counters.polls.load(Ordering::SeqCst)
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a fake load-generator worker on a local port.
///
/// The start reply points the result URL at an unreachable internal host,
/// so the caller must rewrite it to the registered endpoint.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_fake_worker(behavior: WorkerBehavior) -> Result<WorkerHandle, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind fake worker failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("worker addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let counters = Arc::new(WorkerCounters::default());
    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let thread_counters = Arc::clone(&counters);
    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            match listener.accept() {
                Ok((stream, _)) => {
                    if stream.set_nonblocking(false).is_err() {
                        continue;
                    }
                    handle_client(stream, &behavior, &thread_counters);
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok(WorkerHandle {
        endpoint: addr.to_string(),
        counters,
        shutdown: shutdown_tx,
        thread: Some(handle),
    })
}

fn handle_client(mut stream: TcpStream, behavior: &WorkerBehavior, counters: &WorkerCounters) {
    let Some(request_line) = read_request(&mut stream) else {
        return;
    };
    let (status, body) = if request_line.starts_with("POST ") {
        counters.starts.fetch_add(1, Ordering::SeqCst);
        (
            "200 OK",
            format!(
                r#"{{"message":"started","RunID":{},"Count":1,"ResultID":"r1","ResultURL":"http://10.255.0.1:8080/fortio/data/r1.json"}}"#,
                behavior.run_id
            ),
        )
    } else if request_line.starts_with("GET /fortio/data/r1.json") {
        let seen = counters.polls.fetch_add(1, Ordering::SeqCst);
        if seen < behavior.pending_polls {
            ("404 Not Found", "not ready".to_owned())
        } else {
            ("200 OK", behavior.result.clone())
        }
    } else {
        ("404 Not Found", "unknown".to_owned())
    };
    let reply = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if stream.write_all(reply.as_bytes()).is_err() || stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Read one request fully and return its request line.
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    loop {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 {
            return None;
        }
        request.extend_from_slice(buffer.get(..read)?);
        let text = String::from_utf8_lossy(&request).into_owned();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = text.get(..header_end)?;
        let content_length = headers
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= header_end.saturating_add(4).saturating_add(content_length) {
            return headers.lines().next().map(str::to_owned);
        }
    }
}

/// Spawn the `commander` binary and capture output.
///
/// # Errors
///
/// Returns an error if the process cannot be started.
pub fn spawn_commander<I, S>(args: I) -> Result<Child, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = commander_bin()?;
    Command::new(bin)
        .args(args)
        .env("COMMANDER_LOG", "error")
        .env_remove("RUST_LOG")
        .env("NO_PROXY", "*")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn commander failed: {}", err))
}

/// Wait for a child process to exit.
///
/// # Errors
///
/// Returns an error if waiting fails or the timeout is exceeded.
pub fn wait_for_exit(child: &mut Child, timeout: Duration) -> Result<ExitStatus, String> {
    let start = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|err| format!("wait failed: {}", err))?
        {
            return Ok(status);
        }
        if start.elapsed() > timeout {
            drop(child.kill());
            return Err("process timed out".to_owned());
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Run `commander` to completion and return its status, stdout and stderr.
///
/// # Errors
///
/// Returns an error if the process cannot be run or times out.
pub fn run_commander<I, S>(
    args: I,
    timeout: Duration,
) -> Result<(ExitStatus, String, String), String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = spawn_commander(args)?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || read_all(stdout));
    let stderr_reader = thread::spawn(move || read_all(stderr));
    let status = wait_for_exit(&mut child, timeout)?;
    let stdout = stdout_reader
        .join()
        .map_err(|err| format!("stdout reader panicked: {:?}", err))??;
    let stderr = stderr_reader
        .join()
        .map_err(|err| format!("stderr reader panicked: {:?}", err))??;
    Ok((status, stdout, stderr))
}

fn read_all<R: Read>(stream: Option<R>) -> Result<String, String> {
    let mut output = String::new();
    if let Some(mut stream) = stream {
        stream
            .read_to_string(&mut output)
            .map_err(|err| format!("read output failed: {}", err))?;
    }
    Ok(output)
}

/// Pick a local TCP port nobody listens on.
///
/// # Errors
///
/// Returns an error if a local port cannot be allocated.
pub fn pick_port() -> Result<u16, String> {
    TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind port failed: {}", err))?
        .local_addr()
        .map_err(|err| format!("port addr failed: {}", err))
        .map(|addr| addr.port())
}

fn commander_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_commander").map_or_else(
        || Err("CARGO_BIN_EXE_commander missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
