use color_eyre::Result;
use color_eyre::eyre::eyre;
use colored::*;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! run_test {
    ($report:expr, $call:expr) => {
        $report.record(stringify!($call), $call).await
    };
}

/// Runs every listed test against one context, keeps going after failures and fails the
/// suite if any test failed.
#[macro_export]
macro_rules! execute_suite {
    ($context:expr, [ $($test_fn:ident),* $(,)? ]) => {{
        let mut report = $crate::runner::orchestration_utils::SuiteReport::default();
        println!();
        $(
            run_test!(report, $test_fn($context));
        )*
        report.finish()?;
    }};
}

/// Outcome of the tests run so far.
#[derive(Default)]
pub struct SuiteReport {
    passed: Vec<String>,
    failed: Vec<String>,
    elapsed: Duration,
}

impl SuiteReport {
    pub async fn record<Fut>(&mut self, call: &str, test: Fut)
    where
        Fut: Future<Output = Result<()>>,
    {
        let name = test_name(call);
        println!("{}", separator());
        println!("{} {}", " RUNNING ".on_cyan().black().bold(), name.cyan().bold());

        let started = Instant::now();
        let result = test.await;
        let took = started.elapsed();
        self.elapsed += took;

        match result {
            Ok(()) => {
                println!("{} {} ({took:.2?})", " PASSED ".on_green().black().bold(), name.green());
                self.passed.push(name.to_string());
            }
            Err(e) => {
                println!("{} {} ({took:.2?})", " FAILED ".on_red().black().bold(), name.red());
                println!("\n{e:?}");
                self.failed.push(name.to_string());
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        let total = self.passed.len() + self.failed.len();
        println!("{}", separator());
        println!(
            "{} {}/{total} tests passed in {:.2?}.",
            " SUMMARY ".on_purple().black().bold(),
            self.passed.len(),
            self.elapsed
        );
        for name in &self.failed {
            println!("  {} {name}", "✗".red());
        }
        println!("{}", separator());

        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(eyre!("{} of {total} tests failed: {}", self.failed.len(), self.failed.join(", ")))
        }
    }
}

/// `tests::test_photos::test_upload(&context)` -> `test_upload`
fn test_name(call: &str) -> &str {
    let without_args = call.split('(').next().unwrap_or(call);
    without_args.rsplit("::").next().unwrap_or(without_args).trim()
}

fn separator() -> ColoredString {
    "─".repeat(60).truecolor(80, 80, 80)
}

pub fn setup_tracing_and_panic_handling() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,api=debug,common_services=debug,hyper=error,reqwest=error".into()
    });

    let subscriber = fmt::Subscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    color_eyre::install().expect("Failed to install color_eyre");
}

#[cfg(test)]
mod tests {
    use super::test_name;

    #[test]
    fn test_names_drop_paths_and_arguments() {
        assert_eq!(test_name("test_root::test_health_endpoint(&context)"), "test_health_endpoint");
        assert_eq!(test_name("test_wrong_method (& context)"), "test_wrong_method");
    }
}
