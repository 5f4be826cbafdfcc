//! Background thread for XLSX reads and writes
//!
//! Requests and responses cross the thread boundary as plain data: workbooks
//! travel as [`TransferWorkbook`]s, never as live [`Workbook`] values. Every
//! request carries an id and is answered by exactly one response with the
//! same id.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use folio_core::transfer::{self, TransferWorkbook};
use folio_core::Workbook;
use folio_xlsx::{XlsxError, XlsxReader, XlsxResult, XlsxWriter};

/// A job for the worker thread
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRequest {
    /// Decode XLSX bytes
    Read { id: u64, data: Vec<u8> },
    /// Encode a workbook
    Write { id: u64, workbook: TransferWorkbook },
}

impl WorkerRequest {
    /// The request id
    pub fn id(&self) -> u64 {
        match self {
            WorkerRequest::Read { id, .. } | WorkerRequest::Write { id, .. } => *id,
        }
    }
}

/// The worker's answer to one request
#[derive(Debug)]
pub enum WorkerResponse {
    ReadSuccess { id: u64, workbook: TransferWorkbook },
    WriteSuccess { id: u64, data: Vec<u8> },
    Error { id: u64, error: XlsxError },
}

impl WorkerResponse {
    /// Id of the request this answers
    pub fn id(&self) -> u64 {
        match self {
            WorkerResponse::ReadSuccess { id, .. }
            | WorkerResponse::WriteSuccess { id, .. }
            | WorkerResponse::Error { id, .. } => *id,
        }
    }
}

/// Run one request on the calling thread
pub fn handle(request: WorkerRequest) -> WorkerResponse {
    match request {
        WorkerRequest::Read { id, data } => match XlsxReader::read(&data) {
            Ok(workbook) => WorkerResponse::ReadSuccess {
                id,
                workbook: transfer::serialize(&workbook),
            },
            Err(error) => WorkerResponse::Error { id, error },
        },
        WorkerRequest::Write { id, workbook } => {
            let result = transfer::rebuild(workbook)
                .map_err(XlsxError::from)
                .and_then(|workbook| XlsxWriter::write(&workbook));
            match result {
                Ok(data) => WorkerResponse::WriteSuccess { id, data },
                Err(error) => WorkerResponse::Error { id, error },
            }
        }
    }
}

/// Handle to a thread that serves [`WorkerRequest`]s in order
///
/// Submitting returns the request id; [`wait`](Self::wait) blocks for the
/// response to a given id, holding on to any other responses that arrive
/// first. If the thread dies, or the worker is terminated, every request
/// still in flight is answered with a `Stream` error.
pub struct WorkbookWorker {
    requests: Option<Sender<WorkerRequest>>,
    responses: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
    next_id: u64,
    in_flight: BTreeSet<u64>,
    ready: BTreeMap<u64, WorkerResponse>,
}

impl WorkbookWorker {
    /// Start the worker thread
    pub fn spawn() -> XlsxResult<Self> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let (response_tx, response_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("folio-worker".into())
            .spawn(move || {
                for request in request_rx {
                    let id = request.id();
                    tracing::debug!(id, "handling request");
                    let response = handle(request);
                    if response_tx.send(response).is_err() {
                        tracing::debug!(id, "response dropped, handle is gone");
                        break;
                    }
                }
                tracing::debug!("worker thread exiting");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            thread: Some(thread),
            next_id: 1,
            in_flight: BTreeSet::new(),
            ready: BTreeMap::new(),
        })
    }

    /// Queue a read; returns the request id
    pub fn submit_read(&mut self, data: Vec<u8>) -> XlsxResult<u64> {
        let id = self.allocate_id();
        self.submit(WorkerRequest::Read { id, data })?;
        Ok(id)
    }

    /// Queue a write; returns the request id
    pub fn submit_write(&mut self, workbook: &Workbook) -> XlsxResult<u64> {
        let id = self.allocate_id();
        self.submit(WorkerRequest::Write {
            id,
            workbook: transfer::serialize(workbook),
        })?;
        Ok(id)
    }

    /// Queue a request built by the caller
    ///
    /// Ids must not collide with one still in flight.
    pub fn submit(&mut self, request: WorkerRequest) -> XlsxResult<()> {
        let id = request.id();
        if self.in_flight.contains(&id) || self.ready.contains_key(&id) {
            return Err(XlsxError::Stream(format!("request id {} already in use", id)));
        }
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| XlsxError::Stream("worker has been terminated".into()))?;
        sender
            .send(request)
            .map_err(|_| XlsxError::Stream("worker thread is not running".into()))?;
        tracing::debug!(id, "request submitted");
        self.in_flight.insert(id);
        Ok(())
    }

    /// Number of requests submitted but not yet answered
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Block until the response to `id` is available
    pub fn wait(&mut self, id: u64) -> XlsxResult<WorkerResponse> {
        loop {
            if let Some(response) = self.ready.remove(&id) {
                return Ok(response);
            }
            if !self.in_flight.contains(&id) {
                return Err(XlsxError::Stream(format!("no request with id {}", id)));
            }
            match self.responses.recv() {
                Ok(response) => {
                    self.in_flight.remove(&response.id());
                    self.ready.insert(response.id(), response);
                }
                Err(_) => self.reject_in_flight("worker thread stopped"),
            }
        }
    }

    /// Read a workbook on the worker thread and wait for it
    pub fn read(&mut self, data: Vec<u8>) -> XlsxResult<Workbook> {
        let id = self.submit_read(data)?;
        match self.wait(id)? {
            WorkerResponse::ReadSuccess { workbook, .. } => Ok(transfer::rebuild(workbook)?),
            WorkerResponse::Error { error, .. } => Err(error),
            WorkerResponse::WriteSuccess { .. } => Err(unexpected(id)),
        }
    }

    /// Write a workbook on the worker thread and wait for the bytes
    pub fn write(&mut self, workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let id = self.submit_write(workbook)?;
        match self.wait(id)? {
            WorkerResponse::WriteSuccess { data, .. } => Ok(data),
            WorkerResponse::Error { error, .. } => Err(error),
            WorkerResponse::ReadSuccess { .. } => Err(unexpected(id)),
        }
    }

    /// Stop the worker without waiting for it
    ///
    /// Returns every response not yet collected: those that had already
    /// arrived, and a `Stream` error for each request still in flight.
    pub fn terminate(mut self) -> Vec<WorkerResponse> {
        self.requests = None;
        // the thread finishes its current job on its own; nobody waits for it
        self.thread = None;

        while let Ok(response) = self.responses.try_recv() {
            self.in_flight.remove(&response.id());
            self.ready.insert(response.id(), response);
        }
        if !self.in_flight.is_empty() {
            tracing::warn!(
                in_flight = self.in_flight.len(),
                "worker terminated with requests in flight"
            );
        }
        self.reject_in_flight("worker terminated");
        std::mem::take(&mut self.ready).into_values().collect()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn reject_in_flight(&mut self, reason: &str) {
        for id in std::mem::take(&mut self.in_flight) {
            self.ready.insert(
                id,
                WorkerResponse::Error {
                    id,
                    error: XlsxError::Stream(format!("{} before request {} completed", reason, id)),
                },
            );
        }
    }
}

impl Drop for WorkbookWorker {
    fn drop(&mut self) {
        self.requests = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("worker thread panicked");
            }
        }
    }
}

fn unexpected(id: u64) -> XlsxError {
    XlsxError::Stream(format!("unexpected response kind for request {}", id))
}
