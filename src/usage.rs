use indexmap::IndexMap;
use serde::Serialize;

/// Occurrence counts per name; entries are never removed.
///
/// Names may be seeded at count zero so that "declared but never used" can be
/// detected even if they are never observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountSet {
    counts: IndexMap<String, u64>,
}

impl CountSet {
    pub fn add(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn add_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            *self.counts.entry(name.into()).or_insert(0) += 1;
        }
    }

    /// Seeds `names` at count zero without incrementing existing entries.
    pub fn init_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.counts.entry(name.into()).or_insert(0);
        }
    }

    /// Sums every counter of `other` into this set.
    pub fn merge(&mut self, other: &CountSet) {
        for (name, count) in &other.counts {
            *self.counts.entry(name.clone()).or_insert(0) += count;
        }
    }

    pub fn count(&self, name: &str) -> Option<u64> {
        self.counts.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

/// Usage counters for one validation session, mirroring the shape of the API
/// description: resource -> action -> response/mimetype.
///
/// Not internally synchronized; one instance belongs to one session. Results
/// from independent sessions are combined afterwards via [`Usage::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    resources: IndexMap<String, Resource>,
}

impl Usage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resource at `path`, creating an empty entry on first access.
    pub fn resource(&mut self, path: &str) -> &mut Resource {
        self.resources.entry(path.to_string()).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources
            .iter()
            .map(|(path, resource)| (path.as_str(), resource))
    }

    /// Deep-merges `other` into this tree, summing every counter.
    ///
    /// Commutative and associative across any number of sources; merging the
    /// same tree twice doubles its counts.
    pub fn add(&mut self, other: &Usage) {
        for (path, other_resource) in &other.resources {
            let resource = self.resource(path);
            resource.inc_uses(other_resource.uses);
            for (method, other_action) in &other_resource.actions {
                let action = resource.action(method);
                action.inc_uses(other_action.uses);
                action.query_parameters.merge(&other_action.query_parameters);
                action.request_headers.merge(&other_action.request_headers);
                action.response_codes.merge(&other_action.response_codes);
                for (code, other_response) in &other_action.responses {
                    action
                        .response(code)
                        .response_headers
                        .merge(&other_response.response_headers);
                }
                for (name, other_mime_type) in &other_action.mime_types {
                    action
                        .mime_type(name)
                        .form_parameters
                        .merge(&other_mime_type.form_parameters);
                }
            }
        }
    }

    /// Resource paths never exercised by any observed exchange.
    pub fn unused_resources(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter(|(_, resource)| resource.uses == 0)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Actions never exercised, as `<method> <path>`.
    pub fn unused_actions(&self) -> Vec<String> {
        self.collect(|key, action, result| {
            if action.uses == 0 {
                result.push(key.to_string());
            }
        })
    }

    pub fn unused_query_parameters(&self) -> Vec<String> {
        self.collect(|key, action, result| {
            result.extend(unused_names(&action.query_parameters, key));
        })
    }

    /// Unused form parameters, qualified additionally by mimetype.
    pub fn unused_form_parameters(&self) -> Vec<String> {
        self.collect(|key, action, result| {
            for (mime_type, entry) in &action.mime_types {
                for (name, count) in entry.form_parameters.iter() {
                    if count == 0 {
                        result.push(format!("{} in {} ({})", name, key, mime_type));
                    }
                }
            }
        })
    }

    pub fn unused_request_headers(&self) -> Vec<String> {
        self.collect(|key, action, result| {
            result.extend(unused_names(&action.request_headers, key));
        })
    }

    /// Unused response headers, qualified by response code.
    pub fn unused_response_headers(&self) -> Vec<String> {
        self.collect(|key, action, result| {
            for (code, response) in &action.responses {
                for (name, count) in response.response_headers.iter() {
                    if count == 0 {
                        result.push(format!("{} in {} -> {}", name, key, code));
                    }
                }
            }
        })
    }

    pub fn unused_response_codes(&self) -> Vec<String> {
        self.collect(|key, action, result| {
            result.extend(unused_names(&action.response_codes, key));
        })
    }

    /// Runs `collector` once per action with its `<method> <path>` key.
    fn collect<F>(&self, mut collector: F) -> Vec<String>
    where
        F: FnMut(&str, &Action, &mut Vec<String>),
    {
        let mut result = Vec::new();
        for (path, resource) in &self.resources {
            for (method, action) in &resource.actions {
                collector(&format!("{} {}", method, path), action, &mut result);
            }
        }
        result
    }
}

fn unused_names(counts: &CountSet, key: &str) -> Vec<String> {
    counts
        .iter()
        .filter(|(_, count)| *count == 0)
        .map(|(name, _)| format!("{} in {}", name, key))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    uses: u64,
    actions: IndexMap<String, Action>,
}

impl Resource {
    pub fn inc_uses(&mut self, count: u64) {
        self.uses += count;
    }

    pub fn uses(&self) -> u64 {
        self.uses
    }

    /// Returns the action for `method`, creating an empty entry on first access.
    pub fn action(&mut self, method: &str) -> &mut Action {
        self.actions.entry(method.to_string()).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.actions
            .iter()
            .map(|(method, action)| (method.as_str(), action))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Action {
    uses: u64,
    query_parameters: CountSet,
    request_headers: CountSet,
    response_codes: CountSet,
    responses: IndexMap<String, Response>,
    mime_types: IndexMap<String, MimeType>,
}

impl Action {
    pub fn inc_uses(&mut self, count: u64) {
        self.uses += count;
    }

    pub fn uses(&self) -> u64 {
        self.uses
    }

    /// Returns the response for `code`, creating an empty entry on first access.
    pub fn response(&mut self, code: &str) -> &mut Response {
        self.responses.entry(code.to_string()).or_default()
    }

    pub fn responses(&self) -> impl Iterator<Item = (&str, &Response)> {
        self.responses
            .iter()
            .map(|(code, response)| (code.as_str(), response))
    }

    /// Returns the mimetype entry for `name`, creating it on first access.
    pub fn mime_type(&mut self, name: &str) -> &mut MimeType {
        self.mime_types.entry(name.to_string()).or_default()
    }

    pub fn mime_types(&self) -> impl Iterator<Item = (&str, &MimeType)> {
        self.mime_types
            .iter()
            .map(|(name, mime_type)| (name.as_str(), mime_type))
    }

    pub fn add_query_parameters<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_parameters.add_all(names);
    }

    pub fn init_query_parameters<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_parameters.init_all(names);
    }

    pub fn add_request_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_headers.add_all(names);
    }

    pub fn init_request_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_headers.init_all(names);
    }

    pub fn add_response_code(&mut self, code: &str) {
        self.response_codes.add(code);
    }

    pub fn add_response_codes<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_codes.add_all(codes);
    }

    pub fn init_response_codes<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_codes.init_all(codes);
    }

    pub fn query_parameters(&self) -> &CountSet {
        &self.query_parameters
    }

    pub fn request_headers(&self) -> &CountSet {
        &self.request_headers
    }

    pub fn response_codes(&self) -> &CountSet {
        &self.response_codes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Response {
    response_headers: CountSet,
}

impl Response {
    pub fn add_response_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_headers.add_all(names);
    }

    pub fn init_response_headers<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_headers.init_all(names);
    }

    pub fn response_headers(&self) -> &CountSet {
        &self.response_headers
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MimeType {
    form_parameters: CountSet,
}

impl MimeType {
    pub fn add_form_parameters<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.form_parameters.add_all(names);
    }

    pub fn init_form_parameters<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.form_parameters.init_all(names);
    }

    pub fn form_parameters(&self) -> &CountSet {
        &self.form_parameters
    }
}
