use carousel::{WorkerDescriptor, WorkerStatus};

/// Address used for the worker at `index` in every fixture pool.
pub fn worker_address(index: usize) -> String {
    format!("node{index}.example.org")
}

/// `len` workers, all with the same status.
pub fn worker_pool(len: usize, status: WorkerStatus) -> Vec<WorkerDescriptor> {
    (0..len)
        .map(|i| WorkerDescriptor::new(worker_address(i), status))
        .collect()
}

/// `len` ready workers.
pub fn ready_pool(len: usize) -> Vec<WorkerDescriptor> {
    worker_pool(len, WorkerStatus::Ready)
}

/// One worker per status, in order.
pub fn pool_with_statuses(statuses: &[WorkerStatus]) -> Vec<WorkerDescriptor> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| WorkerDescriptor::new(worker_address(i), *status))
        .collect()
}

/// Ready workers with explicit addresses.
pub fn named_pool(addresses: &[&str]) -> Vec<WorkerDescriptor> {
    addresses
        .iter()
        .map(|address| WorkerDescriptor::ready(*address))
        .collect()
}
