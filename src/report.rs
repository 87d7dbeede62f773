use super::*;

/// A transfer report, printed as a single line of JSON on stdout.
#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct Report {
  pub(crate) name: String,
  pub(crate) size: u64,
  pub(crate) elapsed_seconds: f64,
  pub(crate) throughput_bytes_per_second: u64,
}

impl Report {
  pub(crate) fn new(name: String, size: u64, elapsed: Duration) -> Self {
    let elapsed_seconds = elapsed.as_secs_f64();

    Self {
      name,
      size,
      elapsed_seconds,
      throughput_bytes_per_second: if elapsed_seconds > 0.0 {
        (size as f64 / elapsed_seconds) as u64
      } else {
        0
      },
    }
  }

  pub(crate) fn print(&self) {
    println!("{}", serde_json::to_string(self).unwrap());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_line() {
    assert_eq!(
      serde_json::to_string(&Report::new("hello.txt".into(), 1024, Duration::from_secs(2)))
        .unwrap(),
      r#"{"name":"hello.txt","size":1024,"elapsed_seconds":2.0,"throughput_bytes_per_second":512}"#,
    );
  }

  #[test]
  fn zero_duration() {
    let report = Report::new("empty".into(), 100, Duration::ZERO);

    assert_eq!(report.throughput_bytes_per_second, 0);
  }
}
