use colframe_core::config::{DEFAULT_DISPLAY_MAX_ROWS, ExecutionConfig};
use colframe_core::frame;

// Runs in its own test binary since it changes the process-wide config.
#[test]
fn global_config_controls_display() {
    let df = frame! { "v" => (0..50).collect::<Vec<i64>>() }.unwrap();

    let rendered = df.to_string();
    assert_eq!(DEFAULT_DISPLAY_MAX_ROWS + 8, rendered.lines().count());

    let mut conf = ExecutionConfig::global();
    conf.set_from_str("display_max_rows", "4").unwrap();
    ExecutionConfig::set_global(conf);

    let rendered = df.to_string();
    assert_eq!(4 + 8, rendered.lines().count());
    assert!(rendered.contains("| 49 "), "{rendered}");
    assert!(rendered.contains('…'));

    ExecutionConfig::set_global(ExecutionConfig::default());
    assert_eq!(DEFAULT_DISPLAY_MAX_ROWS, ExecutionConfig::global().display_max_rows);
}

#[test]
fn from_env_overrides() {
    // Only this test reads the variable.
    unsafe { std::env::set_var("COLFRAME_CSV_INFER_SAMPLE_ROWS", "12") };
    let conf = ExecutionConfig::from_env().unwrap();
    assert_eq!(12, conf.csv_infer_sample_rows);
    assert_eq!(DEFAULT_DISPLAY_MAX_ROWS, conf.display_max_rows);
    unsafe { std::env::remove_var("COLFRAME_CSV_INFER_SAMPLE_ROWS") };
}
