use super::*;

/// Connection retry policy. The first attempt runs immediately, and the
/// delay before each subsequent attempt doubles, starting at
/// `initial_delay` and capped at `max_delay`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Policy {
  pub(crate) attempts: u32,
  pub(crate) initial_delay: Duration,
  pub(crate) max_delay: Duration,
}

/// Runs `op` until it succeeds or `policy.attempts` attempts have failed,
/// returning the first success or the last error.
pub(crate) async fn retry<T, E, F, Fut>(policy: Policy, mut op: F) -> Result<T, E>
where
  E: Display,
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
{
  assert!(policy.attempts > 0, "retry policy must allow an attempt");

  let mut delay = policy.initial_delay.min(policy.max_delay);

  let mut attempt = 0;

  loop {
    attempt += 1;

    match op().await {
      Ok(value) => return Ok(value),
      Err(err) => {
        warn!("attempt {attempt} of {} failed: {err}", policy.attempts);

        if attempt == policy.attempts {
          return Err(err);
        }

        tokio::time::sleep(delay).await;

        delay = delay.saturating_mul(2).min(policy.max_delay);
      }
    }
  }
}
