//! Background layout worker.
//!
//! A [`LayoutWorker`] owns one dedicated thread. Requests go in over a
//! channel; each submission gets its own reply channel wrapped in a
//! [`PendingLayout`]. The caller never shares simulation state with the
//! worker. Dropping a [`PendingLayout`] discards its result and, if the job
//! has not started yet, skips it. Dropping the [`LayoutWorker`] itself never
//! blocks: queued jobs are skipped and a job already running finishes on the
//! detached thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{LayoutError, Result};
use crate::layout::{LayoutConfig, LayoutRequest, LayoutResponse, layout_with_config};

struct Job {
	request: LayoutRequest,
	reply: mpsc::SyncSender<Result<LayoutResponse>>,
	abandoned: Arc<AtomicBool>,
}

/// Handle to a running layout thread.
pub struct LayoutWorker {
	sender: Option<mpsc::Sender<Job>>,
	handle: Option<JoinHandle<()>>,
	stopped: Arc<AtomicBool>,
}

impl LayoutWorker {
	/// Starts the worker thread. Every request is laid out with `config` as its
	/// base configuration.
	pub fn spawn(config: LayoutConfig) -> Result<Self> {
		config.validate()?;
		let (tx, rx) = mpsc::channel::<Job>();
		let stopped = Arc::new(AtomicBool::new(false));
		let flag = Arc::clone(&stopped);
		let handle = thread::Builder::new()
			.name("depgraph-layout".into())
			.spawn(move || worker_loop(config, rx, flag))?;
		info!("Layout worker started");
		Ok(Self {
			sender: Some(tx),
			handle: Some(handle),
			stopped,
		})
	}

	/// Queues `request` and returns a handle to its eventual result.
	pub fn submit(&self, request: LayoutRequest) -> Result<PendingLayout> {
		let sender = self.sender.as_ref().ok_or(LayoutError::WorkerUnavailable)?;
		let (reply, rx) = mpsc::sync_channel(1);
		let abandoned = Arc::new(AtomicBool::new(false));
		sender
			.send(Job {
				request,
				reply,
				abandoned: Arc::clone(&abandoned),
			})
			.map_err(|_| LayoutError::WorkerUnavailable)?;
		Ok(PendingLayout { rx, abandoned })
	}

	/// Finishes queued jobs, then stops the thread. Blocks until the last job
	/// has been laid out.
	pub fn shutdown(mut self) {
		self.sender.take();
		if let Some(handle) = self.handle.take() {
			if handle.join().is_err() {
				warn!("Layout worker panicked");
			} else {
				info!("Layout worker stopped");
			}
		}
	}
}

impl Drop for LayoutWorker {
	fn drop(&mut self) {
		// Skip whatever is still queued and detach; never wait on a running job.
		self.stopped.store(true, Ordering::Release);
		self.sender.take();
		if self.handle.take().is_some() {
			debug!("Layout worker detached");
		}
	}
}

fn worker_loop(config: LayoutConfig, rx: mpsc::Receiver<Job>, stopped: Arc<AtomicBool>) {
	while let Ok(Job {
		request,
		reply,
		abandoned,
	}) = rx.recv()
	{
		if stopped.load(Ordering::Acquire) {
			debug!("Layout worker dropped, skipping queued jobs");
			break;
		}
		if abandoned.load(Ordering::Acquire) {
			debug!(nodes = request.nodes.len(); "Layout job skipped, requester went away");
			continue;
		}
		debug!(nodes = request.nodes.len(), edges = request.edges.len(); "Layout job received");
		let result = layout_with_config(&request, &config);
		if reply.send(result).is_err() {
			debug!("Layout result discarded, requester went away");
		}
	}
}

/// Result of a submitted layout that may not be ready yet.
///
/// Dropping it before the worker picks the job up cancels the job.
pub struct PendingLayout {
	rx: mpsc::Receiver<Result<LayoutResponse>>,
	abandoned: Arc<AtomicBool>,
}

impl Drop for PendingLayout {
	fn drop(&mut self) {
		self.abandoned.store(true, Ordering::Release);
	}
}

impl PendingLayout {
	/// Blocks until the layout completes.
	pub fn wait(self) -> Result<LayoutResponse> {
		self.rx.recv().map_err(|_| LayoutError::WorkerUnavailable)?
	}

	/// Blocks for at most `timeout`; `None` means the layout is still running.
	pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<LayoutResponse>> {
		match self.rx.recv_timeout(timeout) {
			Ok(result) => Some(result),
			Err(mpsc::RecvTimeoutError::Timeout) => None,
			Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(LayoutError::WorkerUnavailable)),
		}
	}

	/// Non-blocking poll. Yields the result at most once.
	pub fn try_wait(&self) -> Option<Result<LayoutResponse>> {
		match self.rx.try_recv() {
			Ok(result) => Some(result),
			Err(mpsc::TryRecvError::Empty) => None,
			Err(mpsc::TryRecvError::Disconnected) => Some(Err(LayoutError::WorkerUnavailable)),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Instant;

	use super::*;
	use crate::layout::{LayoutEdge, LayoutNode};

	fn request(n: usize) -> LayoutRequest {
		let nodes = (0..n).map(|i| LayoutNode::new(i.to_string())).collect();
		let edges = (1..n).map(|i| LayoutEdge::new(i.to_string(), "0")).collect();
		LayoutRequest::new(nodes, edges, 640.0, 480.0)
	}

	#[test]
	fn worker_result_matches_inline_layout() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		let pending = worker.submit(request(6)).unwrap();
		let from_worker = pending.wait().unwrap();
		let inline = layout_with_config(&request(6), &LayoutConfig::default()).unwrap();
		assert_eq!(from_worker, inline);
	}

	#[test]
	fn jobs_complete_in_submission_order() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		let pending: Vec<_> = (1..4).map(|n| worker.submit(request(n)).unwrap()).collect();
		for (n, p) in (1..4).zip(pending) {
			assert_eq!(p.wait().unwrap().nodes.len(), n);
		}
		worker.shutdown();
	}

	#[test]
	fn errors_are_delivered_to_the_requester() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		let bad = LayoutRequest::new(vec![LayoutNode::new("a")], vec![], -1.0, 10.0);
		let err = worker.submit(bad).unwrap().wait().unwrap_err();
		assert!(matches!(err, LayoutError::InvalidInput(_)));

		let good = worker.submit(request(2)).unwrap();
		assert!(good.wait_timeout(Duration::from_secs(30)).unwrap().is_ok());
	}

	#[test]
	fn dropped_pending_layout_does_not_stall_the_worker() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		drop(worker.submit(request(10)).unwrap());
		assert_eq!(worker.submit(request(3)).unwrap().wait().unwrap().nodes.len(), 3);
	}

	#[test]
	fn abandoned_jobs_are_skipped() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		let started = Instant::now();
		let first = worker.submit(request(200)).unwrap();
		let abandoned: Vec<_> = (0..3).map(|_| worker.submit(request(200)).unwrap()).collect();
		drop(abandoned);
		let last = worker.submit(request(2)).unwrap();

		first.wait().unwrap();
		let one_job = started.elapsed();
		let resumed = Instant::now();
		assert_eq!(last.wait().unwrap().nodes.len(), 2);
		assert!(resumed.elapsed() < one_job, "{:?} vs {one_job:?}", resumed.elapsed());
	}

	#[test]
	fn dropping_the_worker_returns_without_running_queued_jobs() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		let mut pending: Vec<_> = (0..4).map(|_| worker.submit(request(200)).unwrap()).collect();
		let started = Instant::now();
		drop(worker);
		assert!(started.elapsed() < Duration::from_millis(100), "{:?}", started.elapsed());

		let queued = pending.pop().unwrap();
		assert!(matches!(queued.wait(), Err(LayoutError::WorkerUnavailable)));
	}

	#[test]
	fn try_wait_eventually_yields() {
		let worker = LayoutWorker::spawn(LayoutConfig::default()).unwrap();
		let pending = worker.submit(request(2)).unwrap();
		let result = loop {
			if let Some(result) = pending.try_wait() {
				break result;
			}
			thread::sleep(Duration::from_millis(1));
		};
		assert_eq!(result.unwrap().nodes.len(), 2);
	}
}
