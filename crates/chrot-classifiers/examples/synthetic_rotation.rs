use chrot_classifiers::config::ForestConfig;
use chrot_classifiers::data_handling::{default_feature_names, Dataset};
use chrot_classifiers::labeling::LabelRule;
use chrot_classifiers::math::Array2;
use chrot_classifiers::models::classifier_trait::ClassifierModel;
use chrot_classifiers::models::random_forest::RandomForest;
use chrot_classifiers::stats::{accuracy, value_counts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    env_logger::init();

    // 2000 synthetic sensor rounds labelled with the default rotation rule
    let rule = LabelRule::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..2000 {
        let traffic = rng.gen_range(0.0..5000.0f64);
        let packets = rng.gen_range(0.0..5000.0f64);
        let energy = rng.gen_range(0.0..100.0f64);
        let distance = rng.gen_range(0.0..200.0f64);
        labels.push(rule.noisy_label(traffic, packets, energy, &mut rng));
        rows.push(vec![traffic as f32, packets as f32, energy as f32, distance as f32]);
    }

    let x = Array2::from_rows(rows).expect("rows have equal width");
    let dataset = Dataset::new(x, labels, default_feature_names()).expect("valid dataset");
    println!("Label distribution: {:?}", value_counts(&dataset.y));

    let (train, test) = dataset.train_test_split(0.3, 42).expect("split");
    let mut forest = RandomForest::new(ForestConfig::default());
    forest.fit(&train.x, &train.y).expect("fit");

    let predictions = forest.predict(&test.x).expect("predict");
    println!("Model Accuracy: {:.2}", accuracy(&test.y, &predictions));
    for (name, importance) in dataset.feature_names.iter().zip(forest.feature_importances()) {
        println!("{:>16}: {:.3}", name, importance);
    }
}
