//=========================================================================
// Async Loader
//=========================================================================
//
// Background texture loading with main-thread delivery.
//
// Architecture:
//   main thread                         worker thread
//   ───────────                         ─────────────
//   load_frame(res, cb) ──requests──>   loader.load_texture(res)
//   poll() <──────────────results────   Result<Texture, _>
//     ├─ pool.adopt(Frame)   (count 0)
//     └─ cb(result)
//
// Frames only enter the pool on delivery, so no drain can reach one
// before its callback has run. A callback that wants to keep the frame
// retains it; `poll` flags the pool afterwards so unclaimed frames are
// destroyed by the next drain.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::texture::{Frame, Resource, ResourceLoader, Texture};
use crate::core::error::ResourceError;
use crate::core::object::{PoolHandle, Shared};

//=== Type Aliases ========================================================

/// Completion callback, run on the thread calling [`AsyncLoader::poll`].
pub type LoadCallback = Box<dyn FnOnce(Result<Shared<Frame>, ResourceError>)>;

//=== Messages ============================================================

struct LoadRequest {
    ticket: u64,
    resource: Resource,
}

struct LoadResult {
    ticket: u64,
    resource: Resource,
    result: Result<Texture, ResourceError>,
}

//=== AsyncLoader =========================================================

/// Loads frames on a worker thread and hands them back on `poll`.
pub struct AsyncLoader {
    requests: Option<Sender<LoadRequest>>,
    results: Receiver<LoadResult>,
    pending: HashMap<u64, LoadCallback>,
    next_ticket: u64,
    pool: PoolHandle,
    worker: Option<JoinHandle<()>>,
}

impl AsyncLoader {
    //--- Construction -----------------------------------------------------

    /// Spawns the worker thread.
    pub fn new(loader: Arc<dyn ResourceLoader>, pool: PoolHandle) -> Self {
        let (request_tx, request_rx) = unbounded::<LoadRequest>();
        let (result_tx, result_rx) = unbounded::<LoadResult>();

        let worker = thread::Builder::new()
            .name("aetheric-loader".to_string())
            .spawn(move || Self::worker_loop(loader, request_rx, result_tx));

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!(target: "resource", "Failed to spawn loader thread: {}", err);
                None
            }
        };

        Self {
            requests: Some(request_tx),
            results: result_rx,
            pending: HashMap::new(),
            next_ticket: 0,
            pool,
            worker,
        }
    }

    fn worker_loop(
        loader: Arc<dyn ResourceLoader>,
        requests: Receiver<LoadRequest>,
        results: Sender<LoadResult>,
    ) {
        for LoadRequest { ticket, resource } in requests {
            let result = loader.load_texture(&resource);

            if results.send(LoadResult { ticket, resource, result }).is_err() {
                break;
            }
        }
    }

    //--- Requests ---------------------------------------------------------

    /// Queues a load; `callback` runs during a later [`poll`](Self::poll).
    ///
    /// Returns a ticket identifying the request.
    pub fn load_frame<F>(&mut self, resource: Resource, callback: F) -> u64
    where
        F: FnOnce(Result<Shared<Frame>, ResourceError>) + 'static,
    {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let sent = match &self.requests {
            Some(requests) if self.worker.is_some() => requests
                .send(LoadRequest { ticket, resource })
                .is_ok(),
            _ => false,
        };

        if sent {
            self.pending.insert(ticket, Box::new(callback));
        } else {
            warn!(target: "resource", "Loader worker unavailable, request {} dropped", ticket);
            callback(Err(ResourceError::Disconnected));
        }
        ticket
    }

    //--- Delivery ---------------------------------------------------------

    /// Runs callbacks for every finished load; returns how many ran.
    ///
    /// Each frame is adopted by the pool (count 0) right before its
    /// callback runs.
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;

        while let Ok(LoadResult { ticket, resource, result }) = self.results.try_recv() {
            if let Err(err) = &result {
                warn!(target: "resource", "Async load of {} failed: {}", resource, err);
            }

            let Some(callback) = self.pending.remove(&ticket) else {
                continue;
            };
            callback(result.map(|texture| self.pool.adopt(Frame::from_texture(texture))));
            delivered += 1;
        }

        if delivered > 0 {
            self.pool.notify();
            debug!(target: "resource", "Delivered {} async loads ({} pending)", delivered, self.pending.len());
        }
        delivered
    }

    /// Number of requests whose callback has not run yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    //--- Shutdown ---------------------------------------------------------

    /// Stops accepting requests and joins the worker once it has finished
    /// the queued ones. Undelivered callbacks are dropped.
    pub fn shutdown(&mut self) {
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(target: "resource", "Loader thread panicked");
            }
        }
        self.pending.clear();
    }
}

impl Drop for AsyncLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for AsyncLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLoader")
            .field("pending", &self.pending.len())
            .field("running", &self.worker.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
