//! Replaying adapters that serve recorded interactions.

pub mod git;
pub mod id_gen;

pub use git::ReplayingGitRepo;
pub use id_gen::ReplayingIdGenerator;

#[cfg(test)]
pub(crate) fn replayer(
    interactions: Vec<crate::cassette::Interaction>,
) -> crate::cassette::CassetteReplayer {
    let cassette = crate::cassette::Cassette { interactions, ..crate::cassette::Cassette::new("test") };
    crate::cassette::CassetteReplayer::new(&cassette)
}
