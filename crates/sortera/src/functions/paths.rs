use crate::types::{FunctionId, ResourceId, ServerUrl};

/// Collection endpoint for creating functions.
pub(crate) const FUNCTIONS_PATH: &str = "v1/functions";

/// API generation an endpoint family lives under.
///
/// Most of the service runs on `v1`. Training state and metrics are only
/// exposed on `v0.9`, and tags functions keep their sample and invoke
/// endpoints there as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ApiVersion {
    V1,
    V09,
}

impl ApiVersion {
    fn prefix(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V09 => "v0.9",
        }
    }
}

/// Builds endpoint paths for one function's resources.
#[derive(Clone, Debug)]
pub(crate) struct FunctionPaths {
    function_id: FunctionId,
    sample_version: ApiVersion,
}

impl FunctionPaths {
    /// Paths for a single-label classification function.
    pub(crate) fn classification(function_id: FunctionId) -> Self {
        Self {
            function_id,
            sample_version: ApiVersion::V1,
        }
    }

    /// Paths for a multi-label tags function.
    pub(crate) fn tags(function_id: FunctionId) -> Self {
        Self {
            function_id,
            sample_version: ApiVersion::V09,
        }
    }

    pub(crate) fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    fn under(&self, version: ApiVersion) -> String {
        format!("{}/functions/{}", version.prefix(), self.function_id)
    }

    /// `v1/functions/{id}`, serving function metadata and deletion.
    pub(crate) fn meta(&self) -> String {
        self.under(ApiVersion::V1)
    }

    /// `v0.9/functions/{id}`, the only endpoint that reports training state.
    pub(crate) fn state(&self) -> String {
        self.under(ApiVersion::V09)
    }

    pub(crate) fn metrics(&self) -> String {
        format!("{}/metrics", self.under(ApiVersion::V09))
    }

    pub(crate) fn labels(&self) -> String {
        format!("{}/labels", self.under(ApiVersion::V1))
    }

    pub(crate) fn labels_page(&self, page_size: u32) -> String {
        format!("{}?batchSize={page_size}", self.labels())
    }

    pub(crate) fn label(&self, label_id: &ResourceId) -> String {
        format!("{}/{label_id}", self.labels())
    }

    pub(crate) fn fields(&self) -> String {
        format!("{}/fields", self.under(ApiVersion::V1))
    }

    pub(crate) fn fields_page(&self, page_size: u32) -> String {
        format!("{}?batchSize={page_size}", self.fields())
    }

    pub(crate) fn field(&self, field_id: &ResourceId) -> String {
        format!("{}/{field_id}", self.fields())
    }

    pub(crate) fn samples(&self) -> String {
        format!("{}/samples", self.under(self.sample_version))
    }

    /// Samples listing path. Tags functions list newest first so that pages
    /// stay stable while older samples are still being annotated.
    pub(crate) fn samples_page(&self, page_size: u32) -> String {
        match self.sample_version {
            ApiVersion::V1 => format!("{}?batchSize={page_size}", self.samples()),
            ApiVersion::V09 => format!(
                "{}?batchSize={page_size}&sortBy=creation&sortOrder=descending",
                self.samples()
            ),
        }
    }

    pub(crate) fn sample(&self, sample_id: &ResourceId) -> String {
        format!("{}/{sample_id}", self.samples())
    }

    pub(crate) fn annotation(&self, sample_id: &ResourceId) -> String {
        format!("{}/annotation", self.sample(sample_id))
    }

    pub(crate) fn invoke(&self) -> String {
        format!("{}/invoke", self.under(self.sample_version))
    }

    /// Browser URL of the function's training console page.
    pub(crate) fn train_page(&self, server_url: &ServerUrl) -> String {
        server_url.url_for(&format!("console/functions/{}/train", self.function_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification() -> FunctionPaths {
        FunctionPaths::classification(FunctionId::new("function_abc123"))
    }

    fn tags() -> FunctionPaths {
        FunctionPaths::tags(FunctionId::new("function_abc123"))
    }

    #[test]
    fn classification_samples_live_under_v1() {
        let paths = classification();
        assert_eq!(paths.samples(), "v1/functions/abc123/samples");
        assert_eq!(paths.invoke(), "v1/functions/abc123/invoke");
        assert_eq!(
            paths.samples_page(1000),
            "v1/functions/abc123/samples?batchSize=1000"
        );
    }

    #[test]
    fn tags_samples_live_under_v09_with_stable_ordering() {
        let paths = tags();
        assert_eq!(paths.samples(), "v0.9/functions/abc123/samples");
        assert_eq!(paths.invoke(), "v0.9/functions/abc123/invoke");
        assert_eq!(
            paths.samples_page(1000),
            "v0.9/functions/abc123/samples?batchSize=1000&sortBy=creation&sortOrder=descending"
        );
    }

    #[test]
    fn state_and_metrics_always_use_v09() {
        for paths in [classification(), tags()] {
            assert_eq!(paths.state(), "v0.9/functions/abc123");
            assert_eq!(paths.metrics(), "v0.9/functions/abc123/metrics");
        }
    }

    #[test]
    fn labels_and_fields_always_use_v1() {
        for paths in [classification(), tags()] {
            assert_eq!(paths.labels(), "v1/functions/abc123/labels");
            assert_eq!(paths.fields(), "v1/functions/abc123/fields");
        }
    }

    #[test]
    fn annotation_path_nests_under_the_sample() {
        let paths = classification();
        assert_eq!(
            paths.annotation(&ResourceId::new("sample_s1")),
            "v1/functions/abc123/samples/s1/annotation"
        );
    }

    #[test]
    fn train_page_points_at_the_console() {
        let server_url = "https://www.sortera.dev".parse::<ServerUrl>().unwrap();
        assert_eq!(
            classification().train_page(&server_url),
            "https://www.sortera.dev/console/functions/abc123/train"
        );
    }
}
