use anyhow::Result;
use futures::StreamExt;
use std::future::Future;

/// Generate a series of tasks from `task_source` by running `closure` on each item, run those
/// tasks and return their results.
///
/// At most `buffer_size` tasks run at the same time. Results are in the order of completion.
///
/// # Errors
///
/// Return error when any of the generated tasks failed.
pub async fn parallel_future<T, U, W, V>(
    task_source: T,
    buffer_size: usize,
    closure: U,
) -> Result<Vec<V>>
where
    T: Iterator,
    U: FnMut(<T as Iterator>::Item) -> W,
    W: Future<Output = Result<V>> + Sized,
{
    let ret = futures::stream::iter(task_source.map(closure))
        .buffer_unordered(buffer_size)
        .collect::<Vec<Result<V>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<V>>>()?;
    Ok(ret)
}
