use crate::core::period::PeriodCalculator;
use crate::core::sampler::TrajectorySampler;
use crate::core::{ConfigProvider, EphemerisSource, Pipeline, Storage};
use crate::domain::model::{BodyRecord, BodyTrajectory};
use crate::utils::error::{OrbitError, Result};
use chrono::Utc;
use serde::Serialize;

/// Reads the body table: header row first, then `name,obj_id` rows in file order.
pub fn parse_bodies(data: &[u8]) -> Result<Vec<BodyRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    if reader.headers()?.is_empty() {
        return Err(OrbitError::MalformedRow { line: 1, fields: 0 });
    }

    let mut bodies = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() != 2 {
            return Err(OrbitError::MalformedRow {
                line: row.position().map(|p| p.line()).unwrap_or_default(),
                fields: row.len(),
            });
        }
        bodies.push(BodyRecord::new(&row[0], &row[1]));
    }

    Ok(bodies)
}

/// JSON array with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), formatter);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

pub struct OrbitPipeline<S: Storage, C: ConfigProvider, E: EphemerisSource> {
    storage: S,
    config: C,
    source: E,
}

impl<S: Storage, C: ConfigProvider, E: EphemerisSource> OrbitPipeline<S, C, E> {
    pub fn new(storage: S, config: C, source: E) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, E: EphemerisSource> Pipeline for OrbitPipeline<S, C, E> {
    async fn extract(&self) -> Result<Vec<BodyRecord>> {
        tracing::debug!("Reading input table: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        parse_bodies(&data)
    }

    async fn transform(&self, data: Vec<BodyRecord>) -> Result<Vec<BodyTrajectory>> {
        let calculator = PeriodCalculator::new(&self.source);
        let sampler = TrajectorySampler::new(&self.source, self.config.step_count());
        let mut trajectories = Vec::with_capacity(data.len());

        // 逐筆處理，任何一筆失敗就中止整個批次
        for body in data {
            let start = Utc::now();
            let period = calculator.calc_period(&body.obj_id, start).await?;
            let samples = sampler.sample(&body.obj_id, start, &period).await?;

            println!("Got coordinates for {} ({})", body.name, body.obj_id);

            trajectories.push(BodyTrajectory {
                name: body.name,
                obj_id: body.obj_id,
                coords_au: samples.into_iter().map(|s| s.position).collect(),
            });
        }

        Ok(trajectories)
    }

    async fn load(&self, result: Vec<BodyTrajectory>) -> Result<String> {
        let output_path = self.config.output_path().to_string();
        let json = to_pretty_json(&result)?;

        tracing::debug!("Writing {} bytes to {}", json.len(), output_path);
        self.storage.write_file(&output_path, &json).await?;

        println!("Data successfully written to {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::etl::EtlEngine;
    use crate::domain::model::{
        EphemerisSample, OrbitalElements, Position, RefPlane, TimeWindow,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        read_only: bool,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                read_only: false,
            }
        }

        fn read_only(mut self) -> Self {
            self.read_only = true;
            self
        }

        async fn with_input(csv: &str) -> Self {
            let storage = Self::new();
            storage
                .files
                .lock()
                .await
                .insert("asteroids_test.csv".to_string(), csv.as_bytes().to_vec());
            storage
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                OrbitError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.read_only {
                return Err(OrbitError::OutputError {
                    path: path.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::PermissionDenied,
                        "read-only storage",
                    ),
                });
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            "http://horizons.test/api/horizons.api"
        }

        fn input_path(&self) -> &str {
            "asteroids_test.csv"
        }

        fn output_path(&self) -> &str {
            "asteroid_positions.json"
        }

        fn center(&self) -> &str {
            "500@Sun"
        }

        fn ref_plane(&self) -> RefPlane {
            RefPlane::Earth
        }

        fn step_count(&self) -> u32 {
            100
        }

        fn timeout(&self) -> Option<Duration> {
            None
        }
    }

    /// Known bodies by semi-major axis; anything else is unknown to the service.
    struct FakeHorizons {
        axes: HashMap<&'static str, f64>,
    }

    impl FakeHorizons {
        fn new() -> Self {
            Self {
                axes: HashMap::from([("1", 2.7675), ("2", 2.7724), ("4", 2.3615)]),
            }
        }
    }

    #[async_trait]
    impl EphemerisSource for FakeHorizons {
        async fn elements(&self, obj_id: &str, epoch_jd: f64) -> Result<OrbitalElements> {
            let a = self.axes.get(obj_id).copied().ok_or_else(|| {
                OrbitError::MissingEphemerisError {
                    object_id: obj_id.to_string(),
                    detail: "No matches found.".to_string(),
                }
            })?;
            Ok(OrbitalElements {
                epoch_jd_tdb: Some(epoch_jd),
                eccentricity: None,
                semi_major_axis: a,
            })
        }

        async fn vectors(&self, obj_id: &str, window: &TimeWindow) -> Result<Vec<EphemerisSample>> {
            let a = self.axes[obj_id];
            Ok((0..window.steps)
                .map(|i| {
                    let angle = i as f64 / window.steps as f64 * std::f64::consts::TAU;
                    EphemerisSample {
                        jd_tdb: 2_461_329.5 + i as f64,
                        calendar: String::new(),
                        position: Position {
                            x: a * angle.cos(),
                            y: a * angle.sin(),
                            z: 0.1 * angle.sin(),
                        },
                    }
                })
                .collect())
        }
    }

    #[test]
    fn test_parse_bodies_preserves_order() {
        let csv = "name,obj_id\nCeres,1\nPallas,2\nVesta,4\n";
        let bodies = parse_bodies(csv.as_bytes()).unwrap();

        assert_eq!(
            bodies,
            vec![
                BodyRecord::new("Ceres", "1"),
                BodyRecord::new("Pallas", "2"),
                BodyRecord::new("Vesta", "4"),
            ]
        );
    }

    #[test]
    fn test_parse_bodies_header_only() {
        assert!(parse_bodies(b"name,obj_id\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bodies_rejects_wrong_column_count() {
        let csv = "name,obj_id\nCeres,1\nPallas,2,extra\n";
        match parse_bodies(csv.as_bytes()).unwrap_err() {
            OrbitError::MalformedRow { line, fields } => {
                assert_eq!(line, 3);
                assert_eq!(fields, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_bodies_requires_header() {
        assert!(matches!(
            parse_bodies(b""),
            Err(OrbitError::MalformedRow { line: 1, fields: 0 })
        ));
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let json = to_pretty_json(&vec![BodyTrajectory {
            name: "Ceres".to_string(),
            obj_id: "1".to_string(),
            coords_au: vec![Position { x: 1.0, y: 2.0, z: 3.0 }],
        }])
        .unwrap();
        let text = String::from_utf8(json).unwrap();

        assert!(text.starts_with("[\n    {\n        \"name\": \"Ceres\""));
        assert!(text.contains("\n            {\n                \"x\": 1.0,"));
        assert_eq!(to_pretty_json::<[BodyTrajectory]>(&[]).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_extract_missing_input_file() {
        let pipeline = OrbitPipeline::new(MockStorage::new(), MockConfig, FakeHorizons::new());

        let err = pipeline.extract().await.unwrap_err();

        assert!(
            matches!(err, OrbitError::IoError(ref e) if e.kind() == std::io::ErrorKind::NotFound)
        );
    }

    #[tokio::test]
    async fn test_transform_samples_each_body_in_order() {
        let pipeline = OrbitPipeline::new(MockStorage::new(), MockConfig, FakeHorizons::new());
        let bodies = vec![
            BodyRecord::new("Vesta", "4"),
            BodyRecord::new("Ceres", "1"),
            BodyRecord::new("Pallas", "2"),
        ];

        let result = pipeline.transform(bodies).await.unwrap();

        let names: Vec<&str> = result.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Vesta", "Ceres", "Pallas"]);
        for trajectory in &result {
            assert_eq!(trajectory.coords_au.len(), 100);
            assert!(trajectory.coords_au.iter().all(Position::is_finite));
        }
        assert!((result[1].coords_au[0].x - 2.7675).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_transform_aborts_on_unknown_body() {
        let pipeline = OrbitPipeline::new(MockStorage::new(), MockConfig, FakeHorizons::new());
        let bodies = vec![BodyRecord::new("Ceres", "1"), BodyRecord::new("Nobody", "0")];

        let err = pipeline.transform(bodies).await.unwrap_err();

        assert!(matches!(
            err,
            OrbitError::MissingEphemerisError { ref object_id, .. } if object_id == "0"
        ));
    }

    #[tokio::test]
    async fn test_run_writes_all_bodies() {
        let storage = MockStorage::with_input("name,obj_id\nCeres,1\nPallas,2\n").await;
        let pipeline = OrbitPipeline::new(storage.clone(), MockConfig, FakeHorizons::new());

        let output_path = EtlEngine::new(pipeline).run().await.unwrap();
        assert_eq!(output_path, "asteroid_positions.json");

        let written = storage.get_file("asteroid_positions.json").await.unwrap();
        let parsed: Vec<BodyTrajectory> = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Ceres");
        assert_eq!(parsed[0].obj_id, "1");
        assert_eq!(parsed[1].name, "Pallas");
        assert_eq!(parsed[1].coords_au.len(), 100);
    }

    #[tokio::test]
    async fn test_run_with_header_only_writes_empty_array() {
        let storage = MockStorage::with_input("name,obj_id\n").await;
        let pipeline = OrbitPipeline::new(storage.clone(), MockConfig, FakeHorizons::new());

        EtlEngine::new(pipeline).run().await.unwrap();

        let written = storage.get_file("asteroid_positions.json").await.unwrap();
        assert_eq!(written, b"[]");
    }

    #[tokio::test]
    async fn test_run_failure_leaves_no_output() {
        let storage = MockStorage::with_input("name,obj_id\nCeres,1\nBogus,999999999\n").await;
        let pipeline = OrbitPipeline::new(storage.clone(), MockConfig, FakeHorizons::new());

        let result = EtlEngine::new(pipeline).run().await;

        assert!(result.is_err());
        assert!(storage.get_file("asteroid_positions.json").await.is_none());
    }

    #[tokio::test]
    async fn test_run_output_write_failure_is_fatal() {
        let storage = MockStorage::with_input("name,obj_id\nCeres,1\n")
            .await
            .read_only();
        let pipeline = OrbitPipeline::new(storage.clone(), MockConfig, FakeHorizons::new());

        let err = EtlEngine::new(pipeline).run().await.unwrap_err();

        assert!(matches!(
            err,
            OrbitError::OutputError { ref path, .. } if path == "asteroid_positions.json"
        ));
        assert_eq!(err.exit_code(), 3);
        assert!(storage.get_file("asteroid_positions.json").await.is_none());
    }
}
