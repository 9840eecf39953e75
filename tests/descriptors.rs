use std::{fs, time::Duration};

use tish::{
    cmd::{ExecutionPlan, Executor},
    parse::tokenize,
};

fn plan(line: &str) -> ExecutionPlan {
    ExecutionPlan::from_tokens(tokenize(line, 128).unwrap()).unwrap()
}

fn open_descriptors() -> usize {
    fs::read_dir("/proc/self/fd").unwrap().count()
}

// Kept alone in this binary so no other test opens descriptors while it counts.
#[tokio::test]
async fn no_descriptor_outlives_a_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let out = dir.path().join("out.txt");
    fs::write(&input, "b\na\n").unwrap();

    let executor = Executor::new(Duration::from_secs(5));

    // the first spawn sets up the runtime's child reaping
    executor.execute(&plan("true")).await.unwrap();
    let before = open_descriptors();

    let lines = [
        format!("sort < {} > {}", input.display(), out.display()),
        format!("sort < {} | cat > {}", input.display(), out.display()),
        "yes | definitely-not-a-program-tish".to_string(),
        "definitely-not-a-program-tish | cat".to_string(),
        "cat < /nonexistent/tish/in.txt".to_string(),
        format!("cat < {} > /nonexistent/tish/out.txt", input.display()),
    ];

    for line in &lines {
        let _ = executor.execute(&plan(line)).await;
        assert_eq!(open_descriptors(), before, "after `{line}`");
    }

    assert_eq!(fs::read_to_string(&out).unwrap(), "a\nb\n");
}
