use target_lexicon::Triple;

/// Options affecting code generation
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Target the assembly is written for. Only x86-64 is accepted.
    pub triple: Triple,
    /// Write `# ...` comments naming each lowered operation and spill.
    pub annotate: bool,
}

impl CompileOptions {
    pub fn for_triple(triple: Triple) -> Self {
        CompileOptions { triple, annotate: false }
    }

    pub fn annotated(mut self) -> Self {
        self.annotate = true;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions::for_triple(Triple::host())
    }
}
