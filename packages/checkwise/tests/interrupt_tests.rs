use checkwise::install_interrupt_cleanup;

#[test_log::test]
fn second_handler_is_refused_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = dir.path().join(".scratch-1");
    std::fs::create_dir_all(&scratch).unwrap();

    assert!(install_interrupt_cleanup(&scratch));
    assert!(!install_interrupt_cleanup(&scratch));
    assert!(scratch.is_dir());
}
