//! Builder tests against an in-memory backend.
//!
//! The mock backend “compiles” by scanning the source for directives and keeps a ledger of every
//! object it hands out, so that leaks and unexpected link attempts can be observed.

use glpipe::backend::program_pipeline::ProgramPipeline as ProgramPipelineBackend;
use glpipe::backend::shader::{BuildStatus, Shader};
use glpipe::context::GraphicsContext;
use glpipe::pipeline::ProgramPipeline;
use glpipe::shader::{BuildError, Program, ProgramSources, ShaderSource, Stage, StageType};
use log::{Level, LevelFilter, Metadata, Record};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Once;

#[derive(Debug, Default)]
struct Ledger {
  next_id: u32,
  live_stages: BTreeSet<u32>,
  live_programs: BTreeSet<u32>,
  live_pipelines: BTreeSet<u32>,
  compiled: Vec<(StageType, String)>,
  programs_created: usize,
  separable_programs: usize,
  link_attempts: usize,
  validations: usize,
}

impl Ledger {
  fn next(&mut self) -> u32 {
    self.next_id += 1;
    self.next_id
  }
}

type SharedLedger = Rc<RefCell<Ledger>>;

struct MockBackend {
  ledger: SharedLedger,
}

struct MockStage {
  id: u32,
  ty: StageType,
  src: String,
  ledger: SharedLedger,
}

struct MockProgram {
  id: u32,
  ledger: SharedLedger,
  attached: BTreeMap<u32, (StageType, String)>,
  linked: Vec<(StageType, String)>,
}

struct MockPipeline {
  id: u32,
  ledger: SharedLedger,
  stages: BTreeMap<StageType, Vec<(StageType, String)>>,
}

fn declared(src: &str, qualifier: &str) -> BTreeSet<String> {
  src
    .lines()
    .map(str::trim)
    .filter(|line| line.starts_with(qualifier) && line.ends_with(';'))
    .filter_map(|line| line.trim_end_matches(';').split_whitespace().last())
    .map(str::to_owned)
    .collect()
}

unsafe impl Shader for MockBackend {
  type StageRepr = MockStage;
  type ProgramRepr = MockProgram;

  unsafe fn new_stage(&mut self, ty: StageType) -> Option<Self::StageRepr> {
    let id = {
      let mut ledger = self.ledger.borrow_mut();
      let id = ledger.next();
      ledger.live_stages.insert(id);
      id
    };

    Some(MockStage {
      id,
      ty,
      src: String::new(),
      ledger: self.ledger.clone(),
    })
  }

  unsafe fn compile_stage(stage: &mut Self::StageRepr, src: &str) -> BuildStatus {
    stage.src = src.to_owned();
    stage
      .ledger
      .borrow_mut()
      .compiled
      .push((stage.ty, src.to_owned()));

    for (i, line) in src.lines().enumerate() {
      if line.trim_start().starts_with("#error") {
        return BuildStatus::failed(format!("0:{}: error: #error directive", i + 1));
      }
    }

    for (i, line) in src.lines().enumerate() {
      if line.contains("#pragma warning") {
        return BuildStatus {
          success: true,
          log: format!("0:{}: warning: pragma ignored", i + 1),
        };
      }
    }

    BuildStatus::ok()
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    stage.ledger.borrow_mut().live_stages.remove(&stage.id);
  }

  unsafe fn new_program(&mut self, separable: bool) -> Option<Self::ProgramRepr> {
    let id = {
      let mut ledger = self.ledger.borrow_mut();
      let id = ledger.next();
      ledger.live_programs.insert(id);
      ledger.programs_created += 1;

      if separable {
        ledger.separable_programs += 1;
      }

      id
    };

    Some(MockProgram {
      id,
      ledger: self.ledger.clone(),
      attached: BTreeMap::new(),
      linked: Vec::new(),
    })
  }

  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    program
      .attached
      .insert(stage.id, (stage.ty, stage.src.clone()));
  }

  unsafe fn detach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    program.attached.remove(&stage.id);
  }

  unsafe fn link_program(program: &mut Self::ProgramRepr) -> BuildStatus {
    program.ledger.borrow_mut().link_attempts += 1;

    if program.attached.is_empty() {
      return BuildStatus::failed("error: no shaders attached");
    }

    if program
      .attached
      .values()
      .any(|(_, src)| src.contains("#pragma link_error"))
    {
      return BuildStatus::failed("error: undefined reference");
    }

    program.linked = program.attached.values().cloned().collect();

    if program
      .attached
      .values()
      .any(|(_, src)| src.contains("#pragma link_warning"))
    {
      return BuildStatus {
        success: true,
        log: "warning: unused varying".to_owned(),
      };
    }

    BuildStatus::ok()
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    program.ledger.borrow_mut().live_programs.remove(&program.id);
  }
}

unsafe impl ProgramPipelineBackend for MockBackend {
  type PipelineRepr = MockPipeline;

  unsafe fn new_pipeline(&mut self) -> Self::PipelineRepr {
    let mut ledger = self.ledger.borrow_mut();
    let id = ledger.next();
    ledger.live_pipelines.insert(id);

    MockPipeline {
      id,
      ledger: self.ledger.clone(),
      stages: BTreeMap::new(),
    }
  }

  unsafe fn use_program_stage(
    pipeline: &mut Self::PipelineRepr,
    ty: StageType,
    program: &Self::ProgramRepr,
  ) {
    pipeline.stages.insert(ty, program.linked.clone());
  }

  unsafe fn validate_pipeline(pipeline: &mut Self::PipelineRepr) -> BuildStatus {
    pipeline.ledger.borrow_mut().validations += 1;

    let sources = pipeline
      .stages
      .values()
      .flat_map(|linked| linked.iter().map(|(_, src)| src.as_str()))
      .collect::<Vec<_>>();
    let mut log = String::new();

    for pair in sources.windows(2) {
      let outputs = declared(pair[0], "out ");

      for input in declared(pair[1], "in ") {
        if !outputs.contains(&input) {
          log.push_str(&format!("error: input {} has no matching output\n", input));
        }
      }
    }

    if !log.is_empty() {
      BuildStatus::failed(log)
    } else if sources
      .iter()
      .any(|src| src.contains("#pragma validate_warning"))
    {
      BuildStatus {
        success: true,
        log: "warning: stage outputs unused".to_owned(),
      }
    } else {
      BuildStatus::ok()
    }
  }

  unsafe fn destroy_pipeline(pipeline: &mut Self::PipelineRepr) {
    pipeline
      .ledger
      .borrow_mut()
      .live_pipelines
      .remove(&pipeline.id);
  }
}

struct MockContext {
  backend: MockBackend,
}

unsafe impl GraphicsContext for MockContext {
  type Backend = MockBackend;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.backend
  }
}

fn context() -> (MockContext, SharedLedger) {
  let ledger = SharedLedger::default();
  let ctx = MockContext {
    backend: MockBackend {
      ledger: ledger.clone(),
    },
  };

  (ctx, ledger)
}

fn fixture(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

// Records logged on the current thread, so that tests running in parallel don't see each other.
thread_local! {
  static RECORDS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
  fn enabled(&self, _: &Metadata) -> bool {
    true
  }

  fn log(&self, record: &Record) {
    let entry = (record.level(), record.args().to_string());
    RECORDS.with(|records| records.borrow_mut().push(entry));
  }

  fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static LOGGER_INIT: Once = Once::new();

/// Run `f`, returning its result along with what it logged at info level or above.
fn logged<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
  LOGGER_INIT.call_once(|| {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);
  });

  RECORDS.with(|records| records.borrow_mut().clear());
  let output = f();
  let records = RECORDS.with(|records| {
    records
      .borrow_mut()
      .drain(..)
      .filter(|(level, _)| *level <= Level::Info)
      .collect()
  });

  (output, records)
}

const VS: &str = "#version 410 core\nin vec3 position;\nout vec3 v_color;\nvoid main() {}\n";
const FS: &str = "#version 410 core\nin vec3 v_color;\nout vec4 frag;\nvoid main() {}\n";
const BROKEN: &str = "#version 410 core\n#error missing semicolon\nvoid main() {}\n";

#[test]
fn valid_stage_compiles_and_is_released_on_drop() {
  let (mut ctx, ledger) = context();

  let stage = Stage::compile(&mut ctx, StageType::VertexShader, VS).unwrap();
  assert_eq!(stage.ty(), StageType::VertexShader);
  assert_eq!(ledger.borrow().live_stages.len(), 1);

  drop(stage);
  assert!(ledger.borrow().live_stages.is_empty());
}

#[test]
fn advisory_log_does_not_fail_compilation() {
  let (mut ctx, _) = context();
  let src = "#version 410 core\n#pragma warning\nvoid main() {}\n";

  let stage = Stage::compile(&mut ctx, StageType::FragmentShader, src).unwrap();
  assert_eq!(stage.log(), "0:2: warning: pragma ignored");

  let clean = Stage::compile(&mut ctx, StageType::VertexShader, VS).unwrap();
  assert!(clean.log().is_empty());
}

#[test]
fn advisory_link_log_is_kept_on_the_program() {
  let (mut ctx, _) = context();
  let fs = "#version 410 core\n#pragma link_warning\nvoid main() {}\n";

  let program = Program::build(&mut ctx, &ProgramSources::from_strings(VS, fs)).unwrap();
  assert_eq!(program.log(), "warning: unused varying");

  let clean = Program::build(&mut ctx, &ProgramSources::from_strings(VS, FS)).unwrap();
  assert!(clean.log().is_empty());
}

#[test]
fn compile_log_severities() {
  let (mut ctx, _) = context();

  let (result, records) = logged(|| Stage::compile(&mut ctx, StageType::VertexShader, BROKEN));
  assert!(result.is_err());
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].0, Level::Warn);
  assert!(records[0].1.starts_with("vertex shader compilation (<inline>) failed"));
  assert!(records[0].1.contains("error: #error directive"));

  let src = "#version 410 core\n#pragma warning\nvoid main() {}\n";
  let (result, records) = logged(|| Stage::compile(&mut ctx, StageType::VertexShader, src));
  assert!(result.is_ok());
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].0, Level::Info);
  assert!(records[0].1.contains("succeeded with messages"));
  assert!(records[0].1.contains("warning: pragma ignored"));

  let (result, records) = logged(|| Stage::compile(&mut ctx, StageType::VertexShader, VS));
  assert!(result.is_ok());
  assert!(records.is_empty());
}

#[test]
fn link_log_severities() {
  let (mut ctx, _) = context();

  let fs = "#version 410 core\n#pragma link_error\nvoid main() {}\n";
  let (result, records) = logged(|| Program::build(&mut ctx, &ProgramSources::from_strings(VS, fs)));
  assert!(result.is_err());
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].0, Level::Warn);
  assert!(records[0].1.starts_with("program link failed"));
  assert!(records[0].1.contains("undefined reference"));

  let fs = "#version 410 core\n#pragma link_warning\nvoid main() {}\n";
  let (result, records) = logged(|| Program::build(&mut ctx, &ProgramSources::from_strings(VS, fs)));
  assert!(result.is_ok());
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].0, Level::Info);
  assert!(records[0].1.starts_with("program link succeeded with messages"));

  let (result, records) = logged(|| Program::build(&mut ctx, &ProgramSources::from_strings(VS, FS)));
  assert!(result.is_ok());
  assert!(records.is_empty());
}

#[test]
fn validation_log_severities() {
  let (mut ctx, _) = context();
  let mismatched = "#version 410 core\nin vec3 v_normal;\nout vec4 frag;\nvoid main() {}\n";
  let noisy = "#version 410 core\n#pragma validate_warning\nin vec3 v_color;\nvoid main() {}\n";

  for (fs, expected) in vec![
    (mismatched, Some(Level::Warn)),
    (noisy, Some(Level::Info)),
    (FS, None),
  ] {
    let vs = separable(&mut ctx, StageType::VertexShader, VS);
    let fs = separable(&mut ctx, StageType::FragmentShader, fs);
    let mut pipeline = ProgramPipeline::assemble(
      &mut ctx,
      vec![
        (StageType::VertexShader, vs),
        (StageType::FragmentShader, fs),
      ],
    );

    let (result, records) = logged(|| pipeline.validate());
    assert_eq!(result.is_ok(), expected != Some(Level::Warn));

    match expected {
      Some(level) => {
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, level);
        assert!(records[0].1.starts_with("program pipeline validation"));
      }

      None => assert!(records.is_empty()),
    }
  }
}

#[test]
fn invalid_stage_reports_log_and_releases_handle() {
  let (mut ctx, ledger) = context();

  match Stage::compile(&mut ctx, StageType::VertexShader, BROKEN) {
    Err(BuildError::CompileError { stage, log }) => {
      assert_eq!(stage, StageType::VertexShader);
      assert!(log.to_lowercase().contains("error"));
    }
    other => panic!("unexpected result: {:?}", other),
  }

  assert!(ledger.borrow().live_stages.is_empty());
}

#[test]
fn build_links_every_stage_and_releases_them() {
  let (mut ctx, ledger) = context();
  let sources = ProgramSources::from_strings(VS, FS);

  let program = Program::build(&mut ctx, &sources).unwrap();

  assert_eq!(
    program.stages(),
    &[StageType::VertexShader, StageType::FragmentShader]
  );
  assert!(!program.is_separable());
  assert_eq!(program.repr().linked.len(), 2);
  assert!(program.repr().attached.is_empty());

  {
    let ledger = ledger.borrow();
    assert!(ledger.live_stages.is_empty());
    assert_eq!(ledger.live_programs.len(), 1);
    assert_eq!(ledger.link_attempts, 1);
  }

  drop(program);
  assert!(ledger.borrow().live_programs.is_empty());
}

#[test]
fn build_never_links_when_a_stage_fails() {
  let (mut ctx, ledger) = context();
  let sources = ProgramSources::from_strings(VS, BROKEN);

  match Program::build(&mut ctx, &sources) {
    Err(BuildError::CompileError { stage, .. }) => assert_eq!(stage, StageType::FragmentShader),
    other => panic!("unexpected result: {:?}", other),
  }

  let ledger = ledger.borrow();
  assert_eq!(ledger.compiled.len(), 2);
  assert_eq!(ledger.programs_created, 0);
  assert_eq!(ledger.link_attempts, 0);
  assert!(ledger.live_stages.is_empty());
}

#[test]
fn build_reports_first_failing_stage_in_pipeline_order() {
  let (mut ctx, ledger) = context();
  let sources = ProgramSources::new()
    .fragment(ShaderSource::inline(BROKEN))
    .geometry(ShaderSource::inline(BROKEN))
    .vertex(ShaderSource::inline(VS));

  match Program::build(&mut ctx, &sources) {
    Err(BuildError::CompileError { stage, .. }) => assert_eq!(stage, StageType::GeometryShader),
    other => panic!("unexpected result: {:?}", other),
  }

  let compiled = ledger
    .borrow()
    .compiled
    .iter()
    .map(|(ty, _)| *ty)
    .collect::<Vec<_>>();
  assert_eq!(
    compiled,
    vec![
      StageType::VertexShader,
      StageType::GeometryShader,
      StageType::FragmentShader
    ]
  );
}

#[test]
fn link_failure_releases_program_and_stages() {
  let (mut ctx, ledger) = context();
  let fs = "#version 410 core\n#pragma link_error\nvoid main() {}\n";
  let sources = ProgramSources::from_strings(VS, fs);

  match Program::build(&mut ctx, &sources) {
    Err(BuildError::LinkError { log }) => assert!(!log.is_empty()),
    other => panic!("unexpected result: {:?}", other),
  }

  let ledger = ledger.borrow();
  assert_eq!(ledger.programs_created, 1);
  assert_eq!(ledger.link_attempts, 1);
  assert!(ledger.live_programs.is_empty());
  assert!(ledger.live_stages.is_empty());
}

#[test]
fn link_explicit_stages() {
  let (mut ctx, ledger) = context();
  let vs = Stage::compile(&mut ctx, StageType::VertexShader, VS).unwrap();
  let fs = Stage::compile(&mut ctx, StageType::FragmentShader, FS).unwrap();

  let program = Program::link(&mut ctx, &[&vs, &fs]).unwrap();
  assert!(program.repr().attached.is_empty());

  // the stages stay owned by the caller
  assert_eq!(ledger.borrow().live_stages.len(), 2);
  drop(vs);
  drop(fs);
  assert!(ledger.borrow().live_stages.is_empty());
  assert_eq!(ledger.borrow().live_programs.len(), 1);
}

#[test]
fn build_from_files() {
  let (mut ctx, ledger) = context();
  let sources =
    ProgramSources::from_files(fixture("passthrough.vert"), fixture("passthrough.frag"));

  let program = Program::build(&mut ctx, &sources).unwrap();
  assert_eq!(program.stages().len(), 2);
  assert!(ledger.borrow().compiled[0].1.contains("gl_Position"));
}

#[test]
fn missing_file_creates_nothing() {
  let (mut ctx, ledger) = context();
  let missing = fixture("missing.frag");
  let sources = ProgramSources::from_files(fixture("passthrough.vert"), &missing);

  match Program::build(&mut ctx, &sources) {
    Err(BuildError::FileNotFound { path, .. }) => assert_eq!(path, missing),
    other => panic!("unexpected result: {:?}", other),
  }

  let ledger = ledger.borrow();
  assert!(ledger.compiled.is_empty());
  assert_eq!(ledger.programs_created, 0);
}

#[test]
fn prefix_reaches_the_compiler() {
  let (mut ctx, ledger) = context();
  let sources = ProgramSources::from_strings(VS, FS).prefix("#define USE_UBO");

  Program::build(&mut ctx, &sources).unwrap();

  for (_, src) in &ledger.borrow().compiled {
    assert!(src.starts_with("#version 410 core\n#define USE_UBO\n"));
  }
}

#[test]
fn separable_stage_is_a_standalone_program() {
  let (mut ctx, ledger) = context();

  let program =
    Program::build_separable(&mut ctx, StageType::VertexShader, &ShaderSource::inline(VS))
      .unwrap();

  assert!(program.is_separable());
  assert_eq!(program.stages(), &[StageType::VertexShader]);

  let ledger = ledger.borrow();
  assert_eq!(ledger.separable_programs, 1);
  assert!(ledger.live_stages.is_empty());
}

#[test]
fn separable_stage_compile_failure_creates_no_program() {
  let (mut ctx, ledger) = context();

  let result =
    Program::build_separable(&mut ctx, StageType::FragmentShader, &ShaderSource::inline(BROKEN));

  assert!(matches!(result, Err(BuildError::CompileError { .. })));
  assert_eq!(ledger.borrow().programs_created, 0);
}

fn separable(ctx: &mut MockContext, ty: StageType, src: &str) -> Program<MockBackend> {
  Program::build_separable(ctx, ty, &ShaderSource::inline(src)).unwrap()
}

#[test]
fn compatible_pipeline_validates() {
  let (mut ctx, ledger) = context();
  let vs = separable(&mut ctx, StageType::VertexShader, VS);
  let fs = separable(&mut ctx, StageType::FragmentShader, FS);

  let mut pipeline = ProgramPipeline::assemble(
    &mut ctx,
    vec![
      (StageType::VertexShader, vs),
      (StageType::FragmentShader, fs),
    ],
  );

  assert!(pipeline.validate().is_ok());
  assert!(pipeline.is_valid());
  assert_eq!(ledger.borrow().validations, 2);
  assert_eq!(
    pipeline.stages().collect::<Vec<_>>(),
    vec![StageType::VertexShader, StageType::FragmentShader]
  );
}

#[test]
fn mismatched_pipeline_fails_validation_with_log() {
  let (mut ctx, _) = context();
  let vs = separable(&mut ctx, StageType::VertexShader, VS);
  let fs = separable(
    &mut ctx,
    StageType::FragmentShader,
    "#version 410 core\nin vec3 v_normal;\nout vec4 frag;\nvoid main() {}\n",
  );

  let mut pipeline = ProgramPipeline::assemble(
    &mut ctx,
    vec![
      (StageType::VertexShader, vs),
      (StageType::FragmentShader, fs),
    ],
  );

  match pipeline.validate() {
    Err(BuildError::ValidationError { log }) => {
      assert!(!log.trim().is_empty());
      assert!(log.contains("v_normal"));
    }
    other => panic!("unexpected result: {:?}", other),
  }

  assert!(!pipeline.is_valid());
}

#[test]
fn rebinding_a_stage_replaces_its_program() {
  let (mut ctx, ledger) = context();
  let vs = separable(&mut ctx, StageType::VertexShader, VS);
  let mismatched = separable(
    &mut ctx,
    StageType::FragmentShader,
    "#version 410 core\nin vec3 v_normal;\nout vec4 frag;\nvoid main() {}\n",
  );
  let fs = separable(&mut ctx, StageType::FragmentShader, FS);

  let mut pipeline = ProgramPipeline::assemble(
    &mut ctx,
    vec![
      (StageType::VertexShader, vs),
      (StageType::FragmentShader, mismatched),
    ],
  );
  assert!(!pipeline.is_valid());

  let previous = pipeline.set_stage(StageType::FragmentShader, fs);
  assert!(previous.is_some());
  drop(previous);
  assert_eq!(ledger.borrow().live_programs.len(), 2);

  assert!(pipeline.is_valid());

  drop(pipeline);
  let ledger = ledger.borrow();
  assert!(ledger.live_pipelines.is_empty());
  assert!(ledger.live_programs.is_empty());
}

#[test]
fn pipeline_from_fixture_files() {
  let (mut ctx, _) = context();
  let vs = Program::build_separable(
    &mut ctx,
    StageType::VertexShader,
    &ShaderSource::file(fixture("passthrough.vert")),
  )
  .unwrap();
  let fs = Program::build_separable(
    &mut ctx,
    StageType::FragmentShader,
    &ShaderSource::file(fixture("mismatch.frag")),
  )
  .unwrap();

  let mut pipeline = ProgramPipeline::assemble(
    &mut ctx,
    vec![
      (StageType::VertexShader, vs),
      (StageType::FragmentShader, fs),
    ],
  );

  assert!(!pipeline.is_valid());
}
