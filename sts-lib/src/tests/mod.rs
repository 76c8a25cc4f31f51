//! The fifteen NIST SP 800-22 test implementations, each a [`StatTest`].

pub mod approximate_entropy;
pub mod binary_matrix_rank;

use crate::iteration::{ErasedTest, TestAdapter};

/// Builds the default registry of all fifteen tests with their default
/// arguments - what `sts-cmd` hands to [`crate::iteration::run_iterations`]
/// unless the caller overrides a specific test's arguments.
pub fn default_registry() -> Vec<Box<dyn ErasedTest>> {
    vec![
        Box::new(TestAdapter::<frequency::Frequency>::new(())),
        Box::new(TestAdapter::<frequency_block::BlockFrequency>::new(
            frequency_block::BlockFrequencyArgs::ChooseAutomatically,
        )),
        Box::new(TestAdapter::<runs::Runs>::new(())),
        Box::new(TestAdapter::<longest_run_of_ones::LongestRunOfOnes>::new(())),
        Box::new(TestAdapter::<binary_matrix_rank::Rank>::new(())),
        Box::new(TestAdapter::<spectral_fft::Fft>::new(())),
        Box::new(TestAdapter::<non_overlapping_template_matching::NonOverlappingTemplateMatching>::new(
            non_overlapping_template_matching::NonOverlappingTemplateMatchingArgs::default(),
        )),
        Box::new(TestAdapter::<overlapping_template_matching::OverlappingTemplateMatching>::new(
            overlapping_template_matching::OverlappingTemplateMatchingArgs::default(),
        )),
        Box::new(TestAdapter::<universal::Universal>::new(
            universal::UniversalArgs::ChooseAutomatically,
        )),
        Box::new(TestAdapter::<linear_complexity::LinearComplexity>::new(
            linear_complexity::LinearComplexityArgs::ChooseAutomatically,
        )),
        Box::new(TestAdapter::<serial::Serial>::new(serial::SerialArgs::default())),
        Box::new(TestAdapter::<approximate_entropy::ApproximateEntropy>::new(
            approximate_entropy::ApproximateEntropyArgs::default(),
        )),
        Box::new(TestAdapter::<cumulative_sums::CumulativeSums>::new(())),
        Box::new(TestAdapter::<random_excursions::RandomExcursions>::new(())),
        Box::new(TestAdapter::<random_excursions_variant::RandomExcursionsVariant>::new(())),
    ]
}
