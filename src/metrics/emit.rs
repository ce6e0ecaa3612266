//! Line-oriented output for the monitoring agent.
//!
//! One line per metric: `<name>\t<value>\t<unix-timestamp>`.

use std::io::{self, Write};

use super::DerivedMetrics;

/// Renders all nine records, each terminated by a newline.
pub fn render(metrics: &DerivedMetrics) -> String {
    let mut out = String::new();
    for metric in metrics.metrics() {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            metric.name, metric.value, metrics.captured_at
        ));
    }
    out
}

/// Writes the rendered batch with a single write and flushes.
pub fn write_metrics<W: Write>(metrics: &DerivedMetrics, out: &mut W) -> io::Result<()> {
    out.write_all(render(metrics).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DerivedMetrics {
        DerivedMetrics {
            seconds_behind_master: 42,
            io_thread_running: 1,
            sql_thread_running: 0,
            threads_running: 3,
            threads_connected: 50,
            threads_cached: 8,
            max_connections: 151,
            thread_cache_size: 16,
            connection_utilization: 100.0 * 50.0 / 151.0,
            captured_at: 1_700_000_000,
        }
    }

    #[test]
    fn render_matches_plugin_format() {
        let text = render(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(
            lines[0],
            "mysql-lite.replication-behind-master.second\t42\t1700000000"
        );
        assert_eq!(lines[1], "mysql-lite.replication-threads.io\t1\t1700000000");
        assert_eq!(lines[2], "mysql-lite.replication-threads.sql\t0\t1700000000");
        assert_eq!(lines[6], "mysql-lite.threads.max-connections\t151\t1700000000");
        assert_eq!(
            lines[8],
            format!(
                "mysql-lite.connections.utilization\t{}\t1700000000",
                100.0 * 50.0 / 151.0
            )
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn every_line_shares_the_timestamp() {
        let text = render(&sample());
        for line in text.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 3, "line {:?}", line);
            assert_eq!(fields[2], "1700000000");
        }
    }

    #[test]
    fn infinite_utilization_is_rendered_as_inf() {
        let mut metrics = sample();
        metrics.max_connections = 0;
        metrics.connection_utilization = f64::INFINITY;

        let text = render(&metrics);
        assert!(text.contains("mysql-lite.connections.utilization\tinf\t1700000000\n"));
    }

    #[test]
    fn write_metrics_writes_whole_batch() {
        let mut buf = Vec::new();
        write_metrics(&sample(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), render(&sample()));
    }
}
