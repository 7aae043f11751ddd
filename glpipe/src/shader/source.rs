//! Shader sources.

use crate::backend::shader::StageType;
use crate::shader::BuildError;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a whole shader source file.
pub fn read_source_file(path: impl AsRef<Path>) -> Result<String, BuildError> {
  let path = path.as_ref();

  fs::read_to_string(path).map_err(|source| BuildError::FileNotFound {
    path: path.to_owned(),
    source,
  })
}

/// Where the source of a stage comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShaderSource {
  /// Source read from a file when the program is built.
  File(PathBuf),
  /// In-memory source.
  Inline(String),
}

impl ShaderSource {
  /// Source read from the file at `path`.
  pub fn file(path: impl Into<PathBuf>) -> Self {
    ShaderSource::File(path.into())
  }

  /// In-memory source.
  pub fn inline(src: impl Into<String>) -> Self {
    ShaderSource::Inline(src.into())
  }

  /// Get the source text, reading the file if needed.
  pub fn load(&self) -> Result<Cow<str>, BuildError> {
    match *self {
      ShaderSource::File(ref path) => read_source_file(path).map(Cow::Owned),
      ShaderSource::Inline(ref src) => Ok(Cow::Borrowed(src)),
    }
  }

  /// Label used in diagnostics: the file path, or `<inline>`.
  pub fn label(&self) -> Cow<str> {
    match *self {
      ShaderSource::File(ref path) => path.to_string_lossy(),
      ShaderSource::Inline(_) => Cow::Borrowed("<inline>"),
    }
  }
}

impl fmt::Display for ShaderSource {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.label())
  }
}

/// Sources of all the stages of a program.
///
/// A stage type appears at most once; setting it again replaces the previous source.
#[derive(Clone, Debug, Default)]
pub struct ProgramSources {
  stages: BTreeMap<StageType, ShaderSource>,
  prefix: Option<String>,
}

impl ProgramSources {
  /// No stage at all.
  pub fn new() -> Self {
    Self::default()
  }

  /// Vertex and fragment stages read from files.
  pub fn from_files(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
    Self::new()
      .vertex(ShaderSource::file(vertex))
      .fragment(ShaderSource::file(fragment))
  }

  /// Vertex and fragment stages from in-memory strings.
  pub fn from_strings(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
    Self::new()
      .vertex(ShaderSource::inline(vertex))
      .fragment(ShaderSource::inline(fragment))
  }

  /// Set the source of a stage.
  pub fn stage(mut self, ty: StageType, source: ShaderSource) -> Self {
    self.stages.insert(ty, source);
    self
  }

  /// Set the vertex stage.
  pub fn vertex(self, source: ShaderSource) -> Self {
    self.stage(StageType::VertexShader, source)
  }

  /// Set the tessellation control stage.
  pub fn tess_control(self, source: ShaderSource) -> Self {
    self.stage(StageType::TessellationControlShader, source)
  }

  /// Set the tessellation evaluation stage.
  pub fn tess_evaluation(self, source: ShaderSource) -> Self {
    self.stage(StageType::TessellationEvaluationShader, source)
  }

  /// Set the geometry stage.
  pub fn geometry(self, source: ShaderSource) -> Self {
    self.stage(StageType::GeometryShader, source)
  }

  /// Set the fragment stage.
  pub fn fragment(self, source: ShaderSource) -> Self {
    self.stage(StageType::FragmentShader, source)
  }

  /// Text injected after the `#version` line of every stage, typically `#define`s.
  pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = Some(prefix.into());
    self
  }

  /// Source of a given stage, if set.
  pub fn get(&self, ty: StageType) -> Option<&ShaderSource> {
    self.stages.get(&ty)
  }

  /// Iterate over the stages in pipeline order.
  pub fn iter(&self) -> impl Iterator<Item = (StageType, &ShaderSource)> {
    self.stages.iter().map(|(&ty, source)| (ty, source))
  }

  /// Number of stages.
  pub fn len(&self) -> usize {
    self.stages.len()
  }

  /// Whether no stage is set.
  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  /// Load every stage source, with the prefix applied, as `(type, label, text)` triples.
  ///
  /// Stops at the first unreadable file.
  pub(crate) fn load(&self) -> Result<Vec<(StageType, String, String)>, BuildError> {
    self
      .iter()
      .map(|(ty, source)| {
        let src = source.load()?;
        let src = match self.prefix {
          Some(ref prefix) => inject_prefix(&src, prefix),
          None => src.into_owned(),
        };

        Ok::<_, BuildError>((ty, source.label().into_owned(), src))
      })
      .collect()
  }
}

/// Insert `prefix` right after the first `#version` line of `src`.
///
/// Without a `#version` line, the prefix goes at the very top. A newline is appended to the prefix
/// if it lacks one.
pub fn inject_prefix(src: &str, prefix: &str) -> String {
  if prefix.is_empty() {
    return src.to_owned();
  }

  let mut out = String::with_capacity(src.len() + prefix.len() + 2);
  let mut injected = false;

  for line in src.split_inclusive('\n') {
    out.push_str(line);

    if !injected && line.trim_start().starts_with("#version") {
      if !line.ends_with('\n') {
        out.push('\n');
      }

      push_line(&mut out, prefix);
      injected = true;
    }
  }

  if injected {
    out
  } else {
    out.clear();
    push_line(&mut out, prefix);
    out.push_str(src);
    out
  }
}

fn push_line(out: &mut String, line: &str) {
  out.push_str(line);

  if !line.ends_with('\n') {
    out.push('\n');
  }
}

/// Prefix every line with its number.
pub(crate) fn numbered(src: &str) -> String {
  src
    .lines()
    .enumerate()
    .map(|(i, line)| format!("{:4} | {}", i + 1, line))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefix_goes_after_version() {
    let src = "#version 410 core\nvoid main() {}\n";

    assert_eq!(
      inject_prefix(src, "#define TESS"),
      "#version 410 core\n#define TESS\nvoid main() {}\n"
    );
  }

  #[test]
  fn prefix_after_version_without_newline() {
    assert_eq!(
      inject_prefix("#version 330", "#define A\n"),
      "#version 330\n#define A\n"
    );
  }

  #[test]
  fn prefix_without_version_goes_on_top() {
    assert_eq!(
      inject_prefix("void main() {}\n", "#define A"),
      "#define A\nvoid main() {}\n"
    );
  }

  #[test]
  fn empty_prefix_is_noop() {
    let src = "#version 410 core\nvoid main() {}";
    assert_eq!(inject_prefix(src, ""), src);
  }

  #[test]
  fn numbered_lines() {
    assert_eq!(numbered("a\nb"), "   1 | a\n   2 | b");
  }

  #[test]
  fn program_sources_replace_stages() {
    let sources = ProgramSources::from_strings("v0", "f")
      .vertex(ShaderSource::inline("v1"))
      .geometry(ShaderSource::file("shader.geom"));

    let stages = sources.iter().map(|(ty, _)| ty).collect::<Vec<_>>();
    assert_eq!(
      stages,
      vec![
        StageType::VertexShader,
        StageType::GeometryShader,
        StageType::FragmentShader
      ]
    );
    assert_eq!(
      sources.get(StageType::VertexShader),
      Some(&ShaderSource::inline("v1"))
    );
  }

  #[test]
  fn load_applies_prefix_and_labels() {
    let loaded = ProgramSources::from_strings("#version 410 core\nv", "#version 410 core\nf")
      .prefix("#define X 1")
      .load()
      .unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].0, StageType::VertexShader);
    assert_eq!(loaded[0].1, "<inline>");
    assert_eq!(loaded[0].2, "#version 410 core\n#define X 1\nv");
    assert_eq!(loaded[1].2, "#version 410 core\n#define X 1\nf");
  }

  #[test]
  fn missing_file_source() {
    let source = ShaderSource::file("does/not/exist.frag");

    match source.load() {
      Err(BuildError::FileNotFound { path, .. }) => {
        assert_eq!(path, PathBuf::from("does/not/exist.frag"))
      }
      other => panic!("unexpected: {:?}", other),
    }
  }
}
