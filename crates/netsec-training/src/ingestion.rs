use crate::artifacts::DataIngestionArtifact;
use crate::config::DataIngestionConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::frame::Frame;
use netsec_store::DocumentSource;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

/// Identifier field added by the document store; never reaches the feature store.
pub const ID_COLUMN: &str = "_id";
/// Raw token meaning "no value".
pub const MISSING_TOKEN: &str = "na";

/// Pulls the raw collection, persists it as the feature store and writes the
/// train/test split.
pub struct DataIngestion<'a> {
    config: DataIngestionConfig,
    source: &'a dyn DocumentSource,
}

impl<'a> DataIngestion<'a> {
    #[must_use]
    pub fn new(config: DataIngestionConfig, source: &'a dyn DocumentSource) -> Self {
        Self { config, source }
    }

    #[must_use]
    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Reads the whole collection, drops the identifier column and turns the
    /// missing-value token into real missing cells.
    pub fn export_collection_as_dataframe(&self) -> PipelineResult<Frame> {
        let records = self
            .source
            .fetch_all(&self.config.database_name, &self.config.collection_name)?;
        if records.is_empty() {
            return Err(PipelineError::DataFormat(format!(
                "collection {}.{} is empty",
                self.config.database_name, self.config.collection_name
            )));
        }

        let mut frame = Frame::from_records(&records);
        if frame.drop_column(ID_COLUMN) {
            debug!("dropped {ID_COLUMN} column");
        }
        let replaced = frame.replace_with_missing(MISSING_TOKEN);
        info!(
            source = self.source.id(),
            rows = frame.height(),
            columns = frame.width(),
            replaced,
            "exported collection"
        );
        Ok(frame)
    }

    pub fn export_data_into_feature_store(&self, frame: Frame) -> PipelineResult<Frame> {
        let path = &self.config.feature_store_file_path;
        frame.write_csv(path)?;
        info!(path = %path.display(), "wrote feature store");
        Ok(frame)
    }

    pub fn split_data_as_train_test(&self, frame: &Frame) -> PipelineResult<()> {
        let (train_idx, test_idx) =
            split_indices(frame.height(), self.config.train_test_split_ratio, self.config.seed)?;
        info!(train = train_idx.len(), test = test_idx.len(), "performed train/test split");

        frame.select_rows(&train_idx).write_csv(&self.config.training_file_path)?;
        frame.select_rows(&test_idx).write_csv(&self.config.testing_file_path)?;
        info!(
            train = %self.config.training_file_path.display(),
            test = %self.config.testing_file_path.display(),
            "exported train and test files"
        );
        Ok(())
    }

    pub fn initiate_data_ingestion(&self) -> PipelineResult<DataIngestionArtifact> {
        let frame = self.export_collection_as_dataframe()?;
        let frame = self.export_data_into_feature_store(frame)?;
        self.split_data_as_train_test(&frame)?;

        Ok(DataIngestionArtifact {
            train_file_path: self.config.training_file_path.clone(),
            test_file_path: self.config.testing_file_path.clone(),
        })
    }
}

/// Shuffled `(train, test)` row indices; the test side gets `ceil(rows * ratio)`.
fn split_indices(rows: usize, ratio: f64, seed: Option<u64>) -> PipelineResult<(Vec<usize>, Vec<usize>)> {
    #[allow(clippy::cast_precision_loss)]
    let test_len = ((rows as f64) * ratio - 1e-9).ceil().max(0.0) as usize;
    if test_len == 0 || test_len >= rows {
        return Err(PipelineError::DataFormat(format!(
            "cannot split {rows} rows with ratio {ratio}: both splits must be non-empty"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_len);
    Ok((train, indices))
}
