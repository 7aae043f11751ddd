use crate::common::{surface, BROKEN_VS};
use glpipe::shader::{BuildError, Stage, StageType};

pub fn fixture() {
  let mut surface = surface("Compile invalid stage");
  let result = Stage::compile(&mut surface, StageType::VertexShader, BROKEN_VS);

  match result {
    Err(BuildError::CompileError { stage, ref log }) => {
      assert_eq!(stage, StageType::VertexShader);
      assert!(log.to_lowercase().contains("error"), "log: {}", log);
    }

    Err(e) => panic!("unexpected error: {}", e),
    Ok(_) => panic!("broken vertex stage compiled"),
  }
}
