#[cfg(feature = "analysis-cache")]
use std::sync::Arc;

#[cfg(feature = "analysis-cache")]
use nohash_hasher::BuildNoHashHasher;

#[cfg(feature = "analysis-cache")]
use crate::types::Cache;
use crate::types::{code_byte_type, u256, CodeByteType};

/// A hash value in form of a u256. Because it is already a hash there is no
/// need to hash it again when implementing [`std::hash::Hash`].
#[cfg(feature = "analysis-cache")]
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq)]
struct u256Hash(u256);

#[cfg(feature = "analysis-cache")]
impl std::hash::Hash for u256Hash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.into_u64_with_overflow().0);
    }
}

#[cfg(not(feature = "analysis-cache"))]
pub type AnalysisContainer<T> = T;
#[cfg(feature = "analysis-cache")]
pub type AnalysisContainer<T> = Arc<T>;

#[cfg(feature = "analysis-cache")]
const CACHE_SIZE: usize = 1 << 16;

#[cfg(feature = "analysis-cache")]
static CODE_ANALYSIS_CACHE: Cache<
    CACHE_SIZE,
    u256Hash,
    AnalysisContainer<CodeAnalysis>,
    BuildNoHashHasher<u64>,
> = Cache::new();

/// The result of the linear pre-scan of the code: for every byte offset,
/// whether it is an executable opcode, a valid jump destination, or push
/// data. This is the only analysis performed before execution.
#[derive(Debug)]
pub struct CodeAnalysis {
    pub analysis: Vec<CodeByteType>,
}

impl CodeAnalysis {
    #[allow(unused_variables)]
    pub fn new(code: &[u8], code_hash: Option<u256>) -> AnalysisContainer<Self> {
        #[cfg(feature = "analysis-cache")]
        match code_hash {
            Some(code_hash) if code_hash != u256::ZERO => CODE_ANALYSIS_CACHE
                .get_or_insert(u256Hash(code_hash), || {
                    AnalysisContainer::new(Self::analyze_code(code))
                }),
            _ => AnalysisContainer::new(Self::analyze_code(code)),
        }
        #[cfg(not(feature = "analysis-cache"))]
        Self::analyze_code(code)
    }

    fn analyze_code(code: &[u8]) -> Self {
        let mut code_byte_types = vec![CodeByteType::DataOrInvalid; code.len()];

        let mut pc = 0;
        while let Some(op) = code.get(pc).copied() {
            let (code_byte_type, data) = code_byte_type(op);
            code_byte_types[pc] = code_byte_type;
            pc += 1 + data;
        }

        CodeAnalysis {
            analysis: code_byte_types,
        }
    }
}
