//! Work item tracking API client.
//!
//! Every method performs exactly one round trip: it validates its arguments,
//! builds the request, hands it to the [`Dispatcher`] and maps the response
//! onto a record.

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;

use super::credential::PatCredential;
use super::dispatcher::Dispatcher;
use super::mappers::{map_list, map_record};
use super::transport::{
    DEFAULT_TIMEOUT, HttpRequest, ProxySettings, ReqwestTransport, Transport,
};
use crate::constants::{
    LinkType, ProcessTemplate, RELATIONS_APPEND, SourceControlType, StateFilter, system_fields,
};
use crate::error::{DecodeError, Result, VstsError};
use crate::models::{
    Area, Attachment, Comment, CommentList, Field, FieldDefinition, Iteration, Project,
    QueryResult, Team, TeamMember, TestPlan, WorkItem, WorkItemType,
};
use crate::patch::{PatchDocument, PatchOperation};

const JSON: &str = "application/json";
const JSON_PATCH: &str = "application/json-patch+json";
const OCTET_STREAM: &str = "application/octet-stream";

const COMMENTS_API_VERSION: &str = "5.1-preview.3";

/// Construction options for [`VstsClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Collection appended to hosts other than `dev.azure.com`.
    pub collection: String,
    /// `https` unless talking to a local server.
    pub protocol: String,
    /// Per-request timeout.
    pub timeout: std::time::Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            collection: "DefaultCollection".to_string(),
            protocol: "https".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the work item tracking REST API.
///
/// # Example
///
/// ```rust,no_run
/// use vsts_client::VstsClient;
/// use vsts_client::constants::system_fields;
/// use vsts_client::patch::{PatchDocument, PatchOperation};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = VstsClient::new("dev.azure.com/contoso", "my-pat")?;
///
/// let mut doc = PatchDocument::new();
/// doc.add(PatchOperation::add(system_fields::TITLE, "Flying car")?);
/// let feature = client.create_workitem("Contoso", "Feature", &doc, false).await?;
/// println!("Created {:?}", feature.id);
/// # Ok(())
/// # }
/// ```
pub struct VstsClient<T = ReqwestTransport> {
    instance: String,
    protocol: String,
    dispatcher: Dispatcher<T>,
}

impl<T> std::fmt::Debug for VstsClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VstsClient")
            .field("instance", &self.instance)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

impl VstsClient<ReqwestTransport> {
    /// Creates a client for `instance` using the default collection.
    pub fn new(instance: impl Into<String>, personal_access_token: impl Into<String>) -> Result<Self> {
        Self::with_options(
            instance,
            SecretString::from(personal_access_token.into()),
            ClientOptions::default(),
        )
    }

    /// Creates a client with explicit options.
    pub fn with_options(
        instance: impl Into<String>,
        personal_access_token: SecretString,
        options: ClientOptions,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(options.protocol.clone(), options.timeout)
            .map_err(VstsError::Transport)?;
        Self::with_transport(instance, personal_access_token, options, transport)
    }
}

impl<T: Transport> VstsClient<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport(
        instance: impl Into<String>,
        personal_access_token: SecretString,
        options: ClientOptions,
        transport: T,
    ) -> Result<Self> {
        let instance = instance.into();
        validate("instance", &instance)?;
        let credential = PatCredential::new(personal_access_token);
        if credential.is_empty() {
            return Err(VstsError::validation("personal_access_token"));
        }

        let instance = if is_azure_devops_host(&instance) {
            instance
        } else {
            format!("{}/{}", instance, options.collection)
        };

        Ok(Self {
            dispatcher: Dispatcher::new(instance.clone(), Box::new(credential), transport),
            instance,
            protocol: options.protocol.to_lowercase(),
        })
    }

    /// Host plus collection that every request goes to.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    /// Routes subsequent requests through a proxy.
    ///
    /// Takes `&mut self`, so it cannot run while a request is in flight.
    pub fn set_proxy(
        &mut self,
        host: &str,
        port: u16,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<()> {
        validate("host", host)?;
        self.dispatcher
            .transport_mut()
            .set_proxy(ProxySettings {
                host: host.to_string(),
                port,
                user: user.map(str::to_string),
                password: password.map(str::to_string),
            })
            .map_err(VstsError::Transport)
    }

    // OPTIONS {instance}/_apis/{area}
    /// Lists the API resources available under `area`.
    pub async fn get_api_infos(&self, area: &str) -> Result<Value> {
        let request = HttpRequest::new(Method::OPTIONS, format!("/_apis/{area}"))
            .header("Content-Type", JSON);
        Ok(self.dispatcher.perform(request).await?.unwrap_or(Value::Null))
    }

    // GET {instance}/_apis/projects
    /// Lists projects in the given state, one page of `top` starting at `skip`.
    pub async fn get_projects(
        &self,
        state: StateFilter,
        top: u32,
        skip: u32,
    ) -> Result<Vec<Project>> {
        let request = HttpRequest::new(Method::GET, "/_apis/projects")
            .query(format!(
                "api-version=1.0&stateFilter={}&$top={top}&$skip={skip}",
                state.as_str()
            ))
            .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_list).await
    }

    // GET {instance}/_apis/projects/{project}
    /// Fetches a project with its capabilities.
    pub async fn get_project(&self, project_name: &str) -> Result<Project> {
        validate("project_name", project_name)?;

        let request = HttpRequest::new(Method::GET, format!("/_apis/projects/{project_name}"))
            .query("includeCapabilities=true&api-version=1.0")
            .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    // POST {instance}/_apis/projects
    /// Queues creation of a project. The service answers with the queued
    /// operation, so most attributes of the returned record are absent.
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        source_control_type: SourceControlType,
        template: ProcessTemplate,
    ) -> Result<Project> {
        validate("name", name)?;
        validate("description", description)?;

        let payload = json!({
            "name": name,
            "description": description,
            "capabilities": {
                "versioncontrol": {
                    "sourceControlType": source_control_type.as_str()
                },
                "processTemplate": {
                    "templateTypeId": template.type_id()
                }
            }
        });
        let request = HttpRequest::new(Method::POST, "/_apis/projects")
            .query("api-version=2.0-preview")
            .header("Content-Type", JSON)
            .body(json_body(&payload)?);
        self.dispatcher.perform_with(request, map_record).await
    }

    // GET {instance}/{project}/_apis/wit/workItemTypes
    /// Lists the work item types defined in a project.
    pub async fn get_workitem_types(&self, project_name: &str) -> Result<Vec<WorkItemType>> {
        validate("project_name", project_name)?;

        let request =
            HttpRequest::new(Method::GET, format!("/{project_name}/_apis/wit/workItemTypes"))
                .query("api-version=1.0")
                .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_list).await
    }

    /// Changes the type of a work item, e.g. from Bug to User Story.
    pub async fn change_workitem_type(
        &self,
        workitem_id: i64,
        workitem_type_name: &str,
    ) -> Result<WorkItem> {
        validate("workitem_type_name", workitem_type_name)?;

        let mut doc = PatchDocument::new();
        doc.add(PatchOperation::add(
            system_fields::WORKITEM_TYPE,
            workitem_type_name,
        )?);
        self.update_workitem(workitem_id, &doc, false).await
    }

    // GET {instance}/{project}/_apis/wit/classificationNodes/areas?$depth={depth}
    /// Fetches the root area node with `depth` levels of children.
    pub async fn get_areas(&self, project_name: &str, depth: u32) -> Result<Area> {
        validate("project_name", project_name)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/{project_name}/_apis/wit/classificationNodes/areas"),
        )
        .query(format!("$depth={depth}&api-version=1.0"))
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Fetches a single area node by name.
    pub async fn get_area(&self, project_name: &str, name: &str) -> Result<Area> {
        validate("project_name", project_name)?;
        validate("name", name)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/{project_name}/_apis/wit/classificationNodes/areas/{name}"),
        )
        .query("api-version=1.0")
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Creates an area directly under the project root.
    pub async fn create_area(&self, project_name: &str, name: &str) -> Result<Area> {
        validate("project_name", project_name)?;
        validate("name", name)?;

        let request = HttpRequest::new(
            Method::POST,
            format!("/{project_name}/_apis/wit/classificationNodes/areas"),
        )
        .query("api-version=1.0")
        .header("Content-Type", JSON)
        .body(json_body(&json!({ "name": name }))?);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Deletes an area. Work items under it move to `reclassify_id` when given.
    pub async fn delete_area(
        &self,
        project_name: &str,
        area_path: &str,
        reclassify_id: Option<i64>,
    ) -> Result<()> {
        validate("project_name", project_name)?;
        validate("area_path", area_path)?;

        let request = HttpRequest::new(
            Method::DELETE,
            format!("/{project_name}/_apis/wit/classificationNodes/areas/{area_path}"),
        )
        .query(reclassify_query(reclassify_id))
        .header("Content-Type", JSON);
        self.dispatcher.perform(request).await?;
        Ok(())
    }

    // GET {instance}/{project}/_apis/wit/classificationNodes/iterations?$depth={depth}
    /// Fetches the root iteration node with `depth` levels of children.
    pub async fn get_iterations(&self, project_name: &str, depth: u32) -> Result<Iteration> {
        validate("project_name", project_name)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/{project_name}/_apis/wit/classificationNodes/iterations"),
        )
        .query(format!("$depth={depth}&api-version=1.0"))
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Fetches a single iteration node by name.
    pub async fn get_iteration(&self, project_name: &str, name: &str) -> Result<Iteration> {
        validate("project_name", project_name)?;
        validate("name", name)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/{project_name}/_apis/wit/classificationNodes/iterations/{name}"),
        )
        .query("api-version=1.0")
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Creates an iteration with its start and finish dates.
    pub async fn create_iteration(
        &self,
        project_name: &str,
        name: &str,
        start_date: DateTime<Utc>,
        finish_date: DateTime<Utc>,
    ) -> Result<Iteration> {
        validate("project_name", project_name)?;
        validate("name", name)?;

        let payload = json!({
            "name": name,
            "attributes": {
                "startDate": utc_string(&start_date),
                "finishDate": utc_string(&finish_date)
            }
        });
        let request = HttpRequest::new(
            Method::POST,
            format!("/{project_name}/_apis/wit/classificationNodes/iterations"),
        )
        .query("api-version=1.0")
        .header("Content-Type", JSON)
        .body(json_body(&payload)?);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Deletes an iteration. Work items under it move to `reclassify_id` when given.
    pub async fn delete_iteration(
        &self,
        project_name: &str,
        iteration_path: &str,
        reclassify_id: Option<i64>,
    ) -> Result<()> {
        validate("project_name", project_name)?;
        validate("iteration_path", iteration_path)?;

        let request = HttpRequest::new(
            Method::DELETE,
            format!("/{project_name}/_apis/wit/classificationNodes/iterations/{iteration_path}"),
        )
        .query(reclassify_query(reclassify_id))
        .header("Content-Type", JSON);
        self.dispatcher.perform(request).await?;
        Ok(())
    }

    /// Moves a work item to another project, area and iteration.
    pub async fn move_workitem(
        &self,
        workitem_id: i64,
        project_name: &str,
        area_path: &str,
        iteration_path: &str,
    ) -> Result<WorkItem> {
        validate("project_name", project_name)?;
        validate("area_path", area_path)?;
        validate("iteration_path", iteration_path)?;

        let doc: PatchDocument = [
            PatchOperation::add(system_fields::TEAM_PROJECT, project_name)?,
            PatchOperation::add(system_fields::AREA_PATH, area_path)?,
            PatchOperation::add(system_fields::ITERATION_PATH, iteration_path)?,
        ]
        .into_iter()
        .collect();
        self.update_workitem(workitem_id, &doc, false).await
    }

    // GET {instance}/_apis/wit/workitems?ids=1,2,3
    /// Fetches several work items in one request, in the order of `workitem_ids`.
    pub async fn get_workitems_by_id(&self, workitem_ids: &[i64]) -> Result<Vec<WorkItem>> {
        if workitem_ids.is_empty() {
            return Err(VstsError::validation("workitem_ids"));
        }
        let ids = workitem_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let request = HttpRequest::new(Method::GET, "/_apis/wit/workitems")
            .query(format!("ids={ids}&api-version=1.0"))
            .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_list).await
    }

    // GET {instance}/_apis/wit/workitems/{id}?$expand=all
    /// Fetches a work item with its relations expanded.
    pub async fn get_workitem(&self, workitem_id: i64) -> Result<WorkItem> {
        let request = HttpRequest::new(Method::GET, format!("/_apis/wit/workitems/{workitem_id}"))
            .query("api-version=1.0&$expand=all")
            .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    // PATCH {instance}/{project}/_apis/wit/workitems/${type}
    /// Creates a work item of `workitem_type_name` from a patch document.
    ///
    /// With `bypass_rules` the service skips its field rules; this needs
    /// the corresponding project permission.
    pub async fn create_workitem(
        &self,
        project_name: &str,
        workitem_type_name: &str,
        document: &PatchDocument,
        bypass_rules: bool,
    ) -> Result<WorkItem> {
        validate("project_name", project_name)?;
        validate("workitem_type_name", workitem_type_name)?;

        let request = HttpRequest::new(
            Method::PATCH,
            format!("/{project_name}/_apis/wit/workitems/${workitem_type_name}"),
        )
        .query(format!("api-version=1.0&bypassRules={bypass_rules}"))
        .header("Content-Type", JSON_PATCH)
        .body(document.to_body()?);
        self.dispatcher.perform_with(request, map_record).await
    }

    // PATCH {instance}/_apis/wit/workitems/{id}
    /// Applies a patch document to an existing work item.
    pub async fn update_workitem(
        &self,
        workitem_id: i64,
        document: &PatchDocument,
        bypass_rules: bool,
    ) -> Result<WorkItem> {
        let request = HttpRequest::new(Method::PATCH, format!("/_apis/wit/workitems/{workitem_id}"))
            .query(format!("api-version=1.0&bypassRules={bypass_rules}"))
            .header("Content-Type", JSON_PATCH)
            .body(document.to_body()?);
        self.dispatcher.perform_with(request, map_record).await
    }

    // DELETE {instance}/_apis/wit/workitems/{id}
    /// Moves a work item to the recycle bin.
    pub async fn delete_workitem(&self, workitem_id: i64) -> Result<()> {
        let request =
            HttpRequest::new(Method::DELETE, format!("/_apis/wit/workitems/{workitem_id}"))
                .query("api-version=1.0")
                .header("Content-Type", JSON_PATCH);
        self.dispatcher.perform(request).await?;
        Ok(())
    }

    // GET {instance}/{project}/_apis/wit/workitems/{id}/comments
    /// Lists the comments of a work item.
    pub async fn get_comments_from_workitem(
        &self,
        project_name: &str,
        workitem_id: i64,
    ) -> Result<CommentList> {
        validate("project_name", project_name)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/{project_name}/_apis/wit/workitems/{workitem_id}/comments"),
        )
        .query(format!("api-version={COMMENTS_API_VERSION}&$expand=all"))
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Fetches one comment of a work item.
    pub async fn get_comment_from_workitem(
        &self,
        project_name: &str,
        workitem_id: i64,
        comment_id: i64,
    ) -> Result<Comment> {
        validate("project_name", project_name)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/{project_name}/_apis/wit/workitems/{workitem_id}/comments/{comment_id}"),
        )
        .query(format!("api-version={COMMENTS_API_VERSION}&$expand=all"))
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Adds a comment to a work item.
    pub async fn create_comment(
        &self,
        project_name: &str,
        workitem_id: i64,
        text: &str,
        bypass_rules: bool,
    ) -> Result<Comment> {
        validate("project_name", project_name)?;
        validate("text", text)?;

        let request = HttpRequest::new(
            Method::POST,
            format!("/{project_name}/_apis/wit/workitems/{workitem_id}/comments"),
        )
        .query(format!(
            "api-version={COMMENTS_API_VERSION}&bypassRules={bypass_rules}"
        ))
        .header("Content-Type", JSON)
        .body(json_body(&json!({ "text": text }))?);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Deletes a comment from a work item.
    pub async fn delete_comment(
        &self,
        project_name: &str,
        workitem_id: i64,
        comment_id: i64,
    ) -> Result<()> {
        validate("project_name", project_name)?;

        let request = HttpRequest::new(
            Method::DELETE,
            format!("/{project_name}/_apis/wit/workitems/{workitem_id}/comments/{comment_id}"),
        )
        .query(format!("api-version={COMMENTS_API_VERSION}"))
        .header("Content-Type", JSON);
        self.dispatcher.perform(request).await?;
        Ok(())
    }

    /// Replaces the tags of a work item with `tags`.
    pub async fn add_tags(&self, workitem_id: i64, tags: &[&str]) -> Result<WorkItem> {
        if tags.is_empty() {
            return Err(VstsError::validation("tags"));
        }

        let mut doc = PatchDocument::new();
        doc.add(PatchOperation::add(system_fields::TAGS, tags.join("; "))?);
        self.update_workitem(workitem_id, &doc, false).await
    }

    /// Links two work items, e.g. with [`LinkType::Parent`].
    pub async fn add_link(
        &self,
        from_workitem_id: i64,
        to_workitem_id: i64,
        link_type: LinkType,
        comment: &str,
    ) -> Result<WorkItem> {
        let relation = json!({
            "rel": link_type.as_str(),
            "url": format!(
                "{}://{}/_apis/wit/workItems/{}",
                self.protocol, self.instance, to_workitem_id
            ),
            "attributes": {
                "comment": comment
            }
        });

        let mut doc = PatchDocument::new();
        doc.add(PatchOperation::add(RELATIONS_APPEND, relation)?);
        self.update_workitem(from_workitem_id, &doc, false).await
    }

    /// Adds a hyperlink, optionally recording `comment` in the history.
    pub async fn add_hyperlink(
        &self,
        workitem_id: i64,
        url: &str,
        comment: Option<&str>,
    ) -> Result<WorkItem> {
        validate("url", url)?;

        let mut doc = PatchDocument::new();
        doc.add(PatchOperation::add(
            RELATIONS_APPEND,
            json!({ "rel": LinkType::Hyperlink.as_str(), "url": url }),
        )?);
        if let Some(comment) = comment {
            doc.add(PatchOperation::add(system_fields::HISTORY, comment)?);
        }
        self.update_workitem(workitem_id, &doc, false).await
    }

    // POST {instance}/_apis/wit/attachments?filename={filename}
    /// Uploads raw bytes. Link the result with [`VstsClient::add_attachment`].
    pub async fn upload_attachment(&self, filename: &str, data: Vec<u8>) -> Result<Attachment> {
        validate("filename", filename)?;

        let request = HttpRequest::new(Method::POST, "/_apis/wit/attachments")
            .query(format!("api-version=1.0&filename={filename}"))
            .header("Content-Type", OCTET_STREAM)
            .body(data);
        self.dispatcher.perform_with(request, map_record).await
    }

    /// Reads a local file and uploads it under its own file name.
    pub async fn upload_attachment_file(&self, path: impl AsRef<Path>) -> Result<Attachment> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| VstsError::validation("path"))?
            .to_string();
        let data = tokio::fs::read(path).await?;
        self.upload_attachment(&filename, data).await
    }

    /// Links an uploaded attachment to a work item.
    pub async fn add_attachment(
        &self,
        workitem_id: i64,
        attachment_url: &str,
        comment: &str,
    ) -> Result<WorkItem> {
        validate("attachment_url", attachment_url)?;

        let mut doc = PatchDocument::new();
        doc.add(PatchOperation::add(
            RELATIONS_APPEND,
            json!({
                "rel": LinkType::AttachedFile.as_str(),
                "url": attachment_url,
                "attributes": {
                    "comment": comment
                }
            }),
        )?);
        self.update_workitem(workitem_id, &doc, false).await
    }

    // GET {instance}/_apis/projects/{project}/teams
    /// Lists the teams of a project.
    pub async fn get_teams(&self, project_name: &str) -> Result<Vec<Team>> {
        validate("project_name", project_name)?;

        let request =
            HttpRequest::new(Method::GET, format!("/_apis/projects/{project_name}/teams"))
                .query("api-version=5.1&$expand=all")
                .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_list).await
    }

    // GET {instance}/_apis/projects/{project}/teams/{team}/members
    /// Lists the members of a team.
    pub async fn get_team_members(
        &self,
        project_name: &str,
        team_id: &str,
    ) -> Result<Vec<TeamMember>> {
        validate("project_name", project_name)?;
        validate("team_id", team_id)?;

        let request = HttpRequest::new(
            Method::GET,
            format!("/_apis/projects/{project_name}/teams/{team_id}/members"),
        )
        .query("api-version=5.1&$expand=all")
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_list).await
    }

    // POST {instance}/{project}/_apis/test/plans
    /// Creates a test plan. Starts now and lasts a week unless told otherwise.
    pub async fn create_testplan(
        &self,
        project_name: &str,
        name: &str,
        description: &str,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<TestPlan> {
        validate("project_name", project_name)?;
        validate("name", name)?;

        let start_date = start_date.unwrap_or_else(Utc::now);
        let end_date = end_date.unwrap_or(start_date + Duration::days(7));

        let payload = json!({
            "name": name,
            "description": description,
            "startDate": utc_string(&start_date),
            "endDate": utc_string(&end_date)
        });
        let request = HttpRequest::new(Method::POST, format!("/{project_name}/_apis/test/plans"))
            .query("api-version=1.0")
            .header("Content-Type", JSON)
            .body(json_body(&payload)?);
        self.dispatcher.perform_with(request, map_record).await
    }

    // POST {instance}/[{project}/]_apis/wit/wiql
    /// Runs a WIQL query, scoped to a project when one is given.
    pub async fn query(&self, query: &str, project_name: Option<&str>) -> Result<QueryResult> {
        validate("query", query)?;

        let request = HttpRequest::new(Method::POST, scoped_path(project_name, "/_apis/wit/wiql"))
            .query("api-version=1.0")
            .header("Content-Type", JSON)
            .body(json_body(&json!({ "query": query }))?);
        self.dispatcher.perform_with(request, map_record).await
    }

    // POST {instance}/[{project}/]_apis/wit/fields
    /// Creates a field, in a project when one is given, otherwise in the collection.
    pub async fn create_field(
        &self,
        definition: &FieldDefinition,
        project_name: Option<&str>,
    ) -> Result<Field> {
        validate("name", &definition.name)?;
        validate("ref_name", &definition.reference_name)?;

        let request = HttpRequest::new(Method::POST, scoped_path(project_name, "/_apis/wit/fields"))
            .query("api-version=5.1")
            .header("Content-Type", JSON)
            .body(json_body(definition)?);
        self.dispatcher.perform_with(request, map_record).await
    }

    // GET {instance}/[{project}/]_apis/wit/fields/{field}
    /// Fetches a field by name or reference name.
    pub async fn get_field(
        &self,
        field_name_or_ref_name: &str,
        project_name: Option<&str>,
    ) -> Result<Field> {
        validate("field_name_or_ref_name", field_name_or_ref_name)?;

        let request = HttpRequest::new(
            Method::GET,
            scoped_path(
                project_name,
                &format!("/_apis/wit/fields/{field_name_or_ref_name}"),
            ),
        )
        .query("api-version=5.1")
        .header("Content-Type", JSON);
        self.dispatcher.perform_with(request, map_record).await
    }

    // DELETE {instance}/[{project}/]_apis/wit/fields/{field}
    /// Deletes a field by name or reference name.
    pub async fn delete_field(
        &self,
        field_name_or_ref_name: &str,
        project_name: Option<&str>,
    ) -> Result<()> {
        validate("field_name_or_ref_name", field_name_or_ref_name)?;

        let request = HttpRequest::new(
            Method::DELETE,
            scoped_path(
                project_name,
                &format!("/_apis/wit/fields/{field_name_or_ref_name}"),
            ),
        )
        .query("api-version=5.1")
        .header("Content-Type", JSON);
        self.dispatcher.perform(request).await?;
        Ok(())
    }
}

/// Hosted organizations on `dev.azure.com` have no collection segment.
fn is_azure_devops_host(instance: &str) -> bool {
    instance.contains("dev.azure.com")
}

fn validate(argument: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VstsError::validation(argument));
    }
    Ok(())
}

fn scoped_path(project_name: Option<&str>, path: &str) -> String {
    match project_name {
        Some(project) => format!("/{project}{path}"),
        None => path.to_string(),
    }
}

fn reclassify_query(reclassify_id: Option<i64>) -> String {
    let id = reclassify_id.map(|id| id.to_string()).unwrap_or_default();
    format!("api-version=1.0&$reclassifyId={id}")
}

fn json_body<S: Serialize + ?Sized>(payload: &S) -> Result<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| VstsError::Decode(DecodeError::from(e)))
}

/// Formats a timestamp the way the service's date attributes expect.
fn utc_string(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
