use crate::config::ScanConfig;
use crate::probe;
use crate::types::{ProxyHit, ScanSummary, Task};
use anyhow::{bail, Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Depth of the result queue between the workers and the sink.
const RESULT_QUEUE_DEPTH: usize = 100;

/// Scan the cartesian product of `addrs` × `ports` for open proxies and
/// append one line per confirmed match to `out`, flushing after each write.
///
/// Pipeline: a generator feeds a bounded task queue (capacity = 2 × workers,
/// enqueue blocks when full), a fixed pool of workers drains it and runs the
/// probes in priority order, and a single sink serializes matches in arrival
/// order. The task queue closes only after every pair has been enqueued;
/// each worker exits once the queue is closed and drained; the result queue
/// closes only after the whole pool has exited, so every match reaches the
/// sink. There is no run-level cancellation: per-connection timeouts are the
/// only bounded wait.
///
/// Probe failures are absorbed as negatives; the only errors surfaced here
/// are an empty address/port set and failures writing the output stream.
pub async fn run_scan<W>(
    addrs: &[IpAddr],
    ports: &[u16],
    config: &ScanConfig,
    out: W,
) -> Result<ScanSummary>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    if addrs.is_empty() {
        bail!("no addresses to scan");
    }
    if ports.is_empty() {
        bail!("no ports to scan");
    }

    let workers = config.workers.max(1);
    let (task_tx, task_rx) = mpsc::channel::<Task>(workers * 2);
    let (hit_tx, hit_rx) = mpsc::channel::<ProxyHit>(RESULT_QUEUE_DEPTH);
    let task_rx = Arc::new(Mutex::new(task_rx));
    let scanned = Arc::new(AtomicU64::new(0));

    let sink = tokio::spawn(write_hits(hit_rx, out));

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        pool.spawn(run_worker(
            task_rx.clone(),
            hit_tx.clone(),
            config.clone(),
            scanned.clone(),
        ));
    }
    // Workers hold the only remaining hit senders; once they all exit, the
    // result channel closes and the sink drains out.
    drop(hit_tx);
    // Likewise the workers must hold the only handles on the task receiver,
    // so that if the pool exits early the producer's send fails instead of
    // blocking on a queue nobody will drain.
    drop(task_rx);

    'produce: for &ip in addrs {
        for &port in ports {
            // Blocks when the queue is full: backpressure against the pool.
            if task_tx.send(Task { ip, port }).await.is_err() {
                // Workers only bail out early when the sink hit a fatal
                // output error; fall through so that error surfaces.
                break 'produce;
            }
        }
    }
    drop(task_tx); // close the queue: end-of-input for the workers

    while let Some(res) = pool.join_next().await {
        res.context("scan worker panicked")?;
    }

    let hits = sink
        .await
        .context("result sink panicked")?
        .context("failed to write results")?;

    Ok(ScanSummary {
        scanned: scanned.load(Ordering::Relaxed),
        hits,
    })
}

/// One worker: dequeue tasks until the queue is closed and drained, run the
/// probes against each target, and forward the first match (if any).
async fn run_worker(
    task_rx: Arc<Mutex<Receiver<Task>>>,
    hit_tx: Sender<ProxyHit>,
    config: ScanConfig,
    scanned: Arc<AtomicU64>,
) {
    loop {
        let task = { task_rx.lock().await.recv().await };
        let Some(task) = task else { break };

        let addr = SocketAddr::new(task.ip, task.port);
        debug!("testing {addr}");
        if let Some(protocol) = probe::detect(addr, &config).await {
            info!("{addr} -> {protocol}");
            let hit = ProxyHit {
                ip: task.ip,
                port: task.port,
                protocol,
            };
            if hit_tx.send(hit).await.is_err() {
                // Sink is gone (fatal output error); no point probing on.
                break;
            }
        }
        scanned.fetch_add(1, Ordering::Relaxed);
    }
}

/// Result sink: append one formatted line per match, flushing each one so an
/// interrupted run still keeps everything found so far.
async fn write_hits<W>(mut rx: Receiver<ProxyHit>, mut out: W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut hits = 0u64;
    while let Some(hit) = rx.recv().await {
        let line = format!("{hit}\n");
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        hits += 1;
    }
    Ok(hits)
}
