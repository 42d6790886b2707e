//! Integration test: read → aggregate → summarize → CSV.

use snapstat_report::CsvWriter;
use snapstat_stats::{aggregate, summary_record, BenchmarkReader, SampleRow, TailPolicy, VersionLabeler};

const INPUT: &str = "\
version,construct,files
../bitcoin-0.20.0/src,1.0,10
../bitcoin-0.20.0/src,3.0,10
../bitcoin-0.21.0/src,5.0,12
../bitcoin-0.21.0/src,7.0,12
../bitcoin-22.0/src,9.0,20
";

fn run(policy: TailPolicy) -> String {
    let rows: Vec<SampleRow> = BenchmarkReader::new(INPUT.as_bytes(), 2)
        .collect::<Result<_, _>>()
        .unwrap();
    let columns = vec!["Construct leaves (ms)".to_string(), "Number of files".to_string()];
    let labeler = VersionLabeler::new(Some(r".*bitcoin-([^/]+)"), "v").unwrap();

    let mut writer = CsvWriter::new(Vec::new());
    for summary in aggregate(rows, 0.95, policy).unwrap() {
        writer
            .write_record(&summary_record(&summary, &columns, &labeler))
            .unwrap();
    }
    String::from_utf8(writer.finish().unwrap()).unwrap()
}

fn fields(line: &str) -> Vec<&str> {
    line.trim_end_matches(',')
        .split(',')
        .map(|f| f.trim_matches('"'))
        .collect()
}

#[test]
fn writes_header_and_one_row_per_group() {
    let out = run(TailPolicy::DropTrailingSingleton);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "{out}");
    assert_eq!(
        lines[0],
        "\"Version\",\"Construct leaves (ms)\",\"CI Construct leaves (ms)\",\"Number of files\",\"CI Number of files\","
    );

    let first = fields(lines[1]);
    assert_eq!(first[0], "v0.20.0");
    assert_eq!(first[1], "2.0");
    // Two samples one apart on each side of the mean: CI is the t quantile.
    let ci: f64 = first[2].parse().unwrap();
    assert!((ci - 12.706204736174704).abs() < 1e-9, "{ci}");
    assert_eq!(first[3], "10.0");
    assert_eq!(first[4], "0.0");

    let second = fields(lines[2]);
    assert_eq!(second[0], "v0.21.0");
    assert_eq!(second[1], "6.0");
}

#[test]
fn trailing_singleton_emitted_on_request() {
    let out = run(TailPolicy::Emit);
    let last = out.lines().last().unwrap();
    assert_eq!(fields(last), vec!["v22.0", "9.0", "N/A", "20.0", "N/A"]);
}
