/// Entry-point strategies
///
/// A strategy decides how the decorated source-convention names reach the
/// canonical function: as weak symbol aliases, as forwarding functions, or as
/// both with the choice left to the C preprocessor. The mode is fixed once per
/// run; every procedure goes through the same strategy.
use super::aliases::EntryPoints;
use super::signature::Signature;
use serde::Deserialize;

/// How entry points are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AliasMode {
    /// Weak aliases or forwarding stubs, picked by `OPAL_HAVE_WEAK_SYMBOLS` at compile time
    #[default]
    Preprocessor,
    /// Weak aliases only
    Weak,
    /// Forwarding stubs only
    Stubs,
}

/// Interface each entry-point strategy implements.
pub trait EntryPointStrategy {
    /// Append the lines that make every name in `entry` resolve to `entry.canonical`.
    fn emit(&self, entry: &EntryPoints, out: &mut Vec<String>);
}

/// Zero-cost `#pragma weak` aliases; no code is generated.
pub struct WeakAlias;

impl EntryPointStrategy for WeakAlias {
    fn emit(&self, entry: &EntryPoints, out: &mut Vec<String>) {
        for name in &entry.decorated {
            out.push(format!("#pragma weak {} = {}", name, entry.canonical));
        }
        out.push(String::new());
        for name in &entry.modern {
            out.push(format!("#pragma weak {} = {}", name, entry.canonical));
        }
    }
}

/// One small function per name that only calls the canonical function.
pub struct ForwardingStub<'s> {
    pub signature: &'s Signature,
}

impl EntryPointStrategy for ForwardingStub<'_> {
    fn emit(&self, entry: &EntryPoints, out: &mut Vec<String>) {
        let keyword = if self.signature.returns_value { "return " } else { "" };
        for name in entry.names() {
            out.push(format!(
                "{} {}({}) {{ {}{}({}); }}",
                self.signature.return_type, name, self.signature.parameters, keyword, entry.canonical, self.signature.arguments
            ));
        }
    }
}

/// Both strategies behind `#if OPAL_HAVE_WEAK_SYMBOLS`.
pub struct PreprocessorChoice<'s> {
    pub weak: WeakAlias,
    pub stubs: ForwardingStub<'s>,
}

impl EntryPointStrategy for PreprocessorChoice<'_> {
    fn emit(&self, entry: &EntryPoints, out: &mut Vec<String>) {
        out.push("#if OPAL_HAVE_WEAK_SYMBOLS // {".to_string());
        self.weak.emit(entry, out);
        out.push("#else // }{".to_string());
        self.stubs.emit(entry, out);
        out.push("#endif // }".to_string());
    }
}

impl AliasMode {
    pub fn strategy(self, signature: &Signature) -> Box<dyn EntryPointStrategy + '_> {
        match self {
            AliasMode::Preprocessor => Box::new(PreprocessorChoice { weak: WeakAlias, stubs: ForwardingStub { signature } }),
            AliasMode::Weak => Box::new(WeakAlias),
            AliasMode::Stubs => Box::new(ForwardingStub { signature }),
        }
    }
}
