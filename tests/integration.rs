//! Integration tests for Tweet Impact

use tweet_impact::{
    // Charts
    charts::{did, did_differences, scaled_prices, standardized_prices},
    // Text
    nlp::hashtag_counts,
    StopWords, TextNormalizer,
    // Data
    DataLoader, Post, PriceBar,
    // Impact
    ImpactAligner, ImpactTable, MissingPolicy,
    // Utils
    utils::{load_config, save_config},
    AnalysisConfig, Palette,
};
use approx::assert_relative_eq;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const POSTS_CSV: &str = "\
id,conversation_id,tweet,date
101,101,Doge to the moon!,2021-02-01 09:15:00
102,102,@SpaceX Doge rocket soon,2021-02-02 10:00:00
103,103,Tesla stock is fine,2021-02-03 11:30:00
104,104,Dogecoin is the people's crypto,2021-12-28 08:00:00
";

const PRICES_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2021-02-01,0.05,0.055,0.045,0.052,0.052,1000
2021-02-02,0.052,0.065,0.05,0.06,0.06,1200
2021-02-03,0.06,0.07,0.058,0.064,0.064,900
2021-02-04,0.064,0.066,0.05,0.055,0.055,800
2021-12-28,0.18,0.19,0.17,0.175,0.175,700
2021-12-29,0.175,0.18,0.16,0.17,0.17,650
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

mod text_cleaning {
    use super::*;

    #[test]
    fn test_duplicates_are_removed_entirely() {
        let stop_words = StopWords::english_french();
        let cleaned = TextNormalizer::new(&stop_words).clean_texts(&[
            "Doge rocks",
            "Doge rocks",
            "Bitcoin is great",
        ]);

        assert_eq!(cleaned, vec!["Bitcoin great"]);
    }

    #[test]
    fn test_markers_and_links_removed() {
        let stop_words = StopWords::english_french();
        let cleaned = TextNormalizer::new(&stop_words).clean(&[
            "RT @elonmusk: Dogecoin rulz https://t.co/abc123",
        ]);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].tidier, "Dogecoin rulz");
        assert!(!cleaned[0].tidy.contains("http"));
    }

    #[test]
    fn test_hashtags_from_loaded_posts() {
        let posts = [
            "#Dogecoin to the moon #SNL",
            "Watching #SNL tonight",
            "no tags here",
        ];
        let counts = hashtag_counts(&posts);

        assert_eq!(counts[0], ("SNL".to_string(), 2));
        assert_eq!(counts[1], ("Dogecoin".to_string(), 1));
        assert_eq!(counts.len(), 2);
    }
}

mod impact_alignment {
    use super::*;

    fn load() -> (Vec<Post>, Vec<PriceBar>) {
        let dir = tempdir().unwrap();
        let posts_path = write(dir.path(), "posts.csv", POSTS_CSV);
        let prices_path = write(dir.path(), "prices.csv", PRICES_CSV);

        let posts = DataLoader::new().load_posts(&posts_path).unwrap();
        let prices = DataLoader::load_prices(&prices_path).unwrap();
        (posts, prices)
    }

    #[test]
    fn test_single_post_one_day_window() {
        let (posts, prices) = load();
        let table = ImpactAligner::new(1).align(&posts, &prices).unwrap();

        // the reply and the post on the cutoff date are excluded
        assert_eq!(table.len(), 1);
        let record = &table.records()[0];
        assert_eq!(record.timestamp, day("2021-02-01"));
        assert_relative_eq!(record.before, 0.05, epsilon = 1e-12);
        assert_relative_eq!(record.after, 0.06, epsilon = 1e-12);
        assert_relative_eq!(record.differ, 0.01, epsilon = 1e-12);
        assert_eq!(record.post_text, "Doge to the moon!");
        assert_eq!(record.source_url, "https://twitter.com/elonmusk/status/101");
    }

    #[test]
    fn test_differ_percent_relation() {
        let (posts, prices) = load();
        let table = ImpactAligner::new(2).align(&posts, &prices).unwrap();

        for record in &table {
            assert_relative_eq!(
                record.differ_percent,
                record.differ_scaled * 100.0 / record.before_scaled,
                epsilon = 1e-9
            );
            assert_relative_eq!(record.after, (0.06 + 0.064) / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inverted_filter_uses_other_posts() {
        let (posts, prices) = load();
        let table = ImpactAligner::new(1).inverted(true).align(&posts, &prices).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].timestamp, day("2021-02-03"));
        assert_relative_eq!(table.records()[0].differ, 0.055 - 0.06, epsilon = 1e-12);
    }

    #[test]
    fn test_rows_respect_cutoff_and_filter() {
        let (posts, prices) = load();
        let aligner = ImpactAligner::new(1).with_cutoff(day("2022-01-01"));
        let table = aligner.align(&posts, &prices).unwrap();

        assert_eq!(table.len(), 2);
        for record in &table {
            assert!(record.timestamp < aligner.cutoff());
            assert!(aligner.filter().selects(&record.post_text));
            assert!(!record.post_text.starts_with('@'));
        }
        let differs: Vec<f64> = table.iter().map(|r| r.differ).collect();
        assert!(differs.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_missing_days_policy() {
        let (posts, prices) = load();
        let window = 5;

        let skipped = ImpactAligner::new(window).align(&posts, &prices).unwrap();
        assert_relative_eq!(skipped.records()[0].after, (0.06 + 0.064 + 0.055) / 3.0, epsilon = 1e-12);

        let propagated = ImpactAligner::new(window)
            .with_missing_policy(MissingPolicy::Propagate)
            .align(&posts, &prices)
            .unwrap();
        assert_eq!(propagated.len(), 1);
        assert!(propagated.records()[0].after.is_nan());
    }

    #[test]
    fn test_largest_window_from_config() {
        let (posts, prices) = load();
        let mut config = AnalysisConfig::default();
        config.window_days = u32::MAX;

        let table = ImpactAligner::from_config(&config).align(&posts, &prices).unwrap();
        assert_eq!(table.len(), 1);
        assert_relative_eq!(
            table.records()[0].after,
            (0.06 + 0.064 + 0.055 + 0.175 + 0.17) / 5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_save_impact_table() {
        let (posts, prices) = load();
        let table = ImpactAligner::new(1).align(&posts, &prices).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("impact.csv");
        DataLoader::save_impact_table(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("timestamp,before,after,differ"));
        assert!(header.contains("differ_percent"));
        assert!(lines.next().unwrap().starts_with("2021-02-01,0.05,0.06,"));
        assert!(lines.next().is_none());
    }
}

mod configuration {
    use super::*;

    #[test]
    fn test_config_file_drives_aligner() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "analysis.yaml",
            "window_days: 2\nkeywords: [Tesla]\ncutoff_date: 2021-06-01\n",
        );

        let config = load_config(&path).unwrap();
        let aligner = ImpactAligner::from_config(&config);
        assert_eq!(aligner.window_days(), 2);
        assert_eq!(aligner.cutoff(), day("2021-06-01"));
        assert_eq!(aligner.filter().keywords(), ["Tesla".to_string()]);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn test_config_round_trip_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let mut config = AnalysisConfig::default();
        config.invert_filter = true;
        config.palette.insert("ETH", "#3C3C3D");

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}

mod charts {
    use super::*;

    #[test]
    fn test_charts_from_loaded_prices() {
        let dir = tempdir().unwrap();
        let prices_path = write(dir.path(), "prices.csv", PRICES_CSV);
        let doge = DataLoader::load_prices(&prices_path).unwrap();
        let config = AnalysisConfig::default();

        let spark = scaled_prices(&doge, "DOGE", &config.palette, &config.chart).unwrap();
        assert_eq!(spark.points.len(), doge.len());
        assert_relative_eq!(spark.values()[0], 0.0, epsilon = 1e-12);

        let lines = standardized_prices(&[("DOGE", doge.as_slice())], &config.palette, &config.chart, "")
            .unwrap();
        assert!(lines.to_string().contains("DOGE prices in 2021"));
    }

    #[test]
    fn test_did_against_off_topic_posts() {
        let dir = tempdir().unwrap();
        let posts = DataLoader::new()
            .load_posts(write(dir.path(), "posts.csv", POSTS_CSV))
            .unwrap();
        let prices = DataLoader::load_prices(write(dir.path(), "prices.csv", PRICES_CSV)).unwrap();

        let aligner = ImpactAligner::new(1);
        let doge: ImpactTable = aligner.align(&posts, &prices).unwrap();
        let other: ImpactTable = aligner.clone().inverted(true).align(&posts, &prices).unwrap();

        let palette = Palette::default();
        let groups = [("DOGE", &doge), ("non DOGE", &other)];
        let chart = did(&groups, &palette, "Doge").unwrap();
        assert_eq!(chart.rows.len(), 2);
        assert_eq!(chart.rows[1].color, "#808080");

        let differences = did_differences(&groups, &palette, "Doge").unwrap();
        for (row, table) in differences.rows.iter().zip([&doge, &other]) {
            assert_eq!(row.before, Some(0.0));
            assert_relative_eq!(row.after.unwrap(), table.scaled_means().unwrap().differ, epsilon = 1e-12);
        }
    }
}
