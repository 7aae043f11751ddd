use crate::common::{surface, VS};
use glpipe::shader::{Stage, StageType};

pub fn fixture() {
  let mut surface = surface("Compile valid stage");
  let stage = Stage::compile(&mut surface, StageType::VertexShader, VS).unwrap();

  assert_eq!(stage.ty(), StageType::VertexShader);
  assert!(
    !stage.log().to_lowercase().contains("error"),
    "compile log: {}",
    stage.log()
  );
}
