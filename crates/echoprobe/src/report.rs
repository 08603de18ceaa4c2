use echoprobe_core::{PingResult, ProbeConfig};

/// Print the probe configuration.
pub fn print_config(config: &ProbeConfig) {
    println!("{config}");
}

/// Print the outcome of a session.
pub fn print_result(result: &PingResult) {
    println!("{}", result.summary(true));
    println!("{}", format_statistics(result));
}

/// Print the outcome of a monitor check, announcing reachability changes.
pub fn print_check(result: &PingResult, previous: Option<bool>) {
    let reachable = result.is_success();
    if previous != Some(reachable) {
        println!("{}", format_reachability(reachable));
    }
    println!("{}", result.summary(false));
}

fn format_statistics(result: &PingResult) -> String {
    format!(
        "Min response time {:.2} ms\n\
         Max response time {:.2} ms\n\
         Ave. response time {:.2} ms\n\
         Std Dev. in response time {:.2} ms\n\
         Total time taken {} ms",
        result.min(),
        result.max(),
        result.mean(),
        result.std_dev(),
        result.total_elapsed().as_millis()
    )
}

const fn format_reachability(reachable: bool) -> &'static str {
    if reachable {
        "Connected"
    } else {
        "Not Connected"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_statistics_empty() {
        let expected = "Min response time 0.00 ms\n\
                        Max response time 0.00 ms\n\
                        Ave. response time 0.00 ms\n\
                        Std Dev. in response time 0.00 ms\n\
                        Total time taken 0 ms";
        assert_eq!(expected, format_statistics(&PingResult::default()));
    }

    #[test]
    fn test_format_reachability() {
        assert_eq!("Connected", format_reachability(true));
        assert_eq!("Not Connected", format_reachability(false));
    }
}
