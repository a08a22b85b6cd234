use rmcp::model::{CallToolResult, Content};

use crate::{error::ToolError, pollinations::PollinationsClient};

pub async fn list_text_models(client: &PollinationsClient) -> Result<CallToolResult, ToolError> {
    let output = client.list_text_models().await?;
    Ok(CallToolResult::success(vec![Content::text(
        output.into_text(),
    )]))
}
