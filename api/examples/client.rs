use reqwest::{multipart, Client};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let pdf = args.next().ok_or("usage: client <file.pdf> [question]")?;
    let question = args
        .next()
        .unwrap_or_else(|| "What are the main topics discussed in this document?".to_string());

    let client = Client::new();
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

    println!("Health Check:");
    let health_json: serde_json::Value = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json()
        .await?;
    println!("Response: {}", serde_json::to_string_pretty(&health_json)?);

    println!("\nUpload {}:", pdf);
    let bytes = tokio::fs::read(&pdf).await?;
    let filename = std::path::Path::new(&pdf)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document.pdf".to_string());
    let form = multipart::Form::new().part("file", multipart::Part::bytes(bytes).file_name(filename));

    let upload_response = client
        .post(format!("{}/upload", base_url))
        .multipart(form)
        .send()
        .await?;
    println!("Status: {}", upload_response.status());
    let upload_json: serde_json::Value = upload_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&upload_json)?);

    let Some(file_path) = upload_json["filePath"].as_str() else {
        return Err("upload failed".into());
    };

    println!("\nQuery:");
    let query_response = client
        .post(format!("{}/query", base_url))
        .json(&json!({ "filePath": file_path, "question": question }))
        .send()
        .await?;

    println!("Status: {}", query_response.status());
    let query_json: serde_json::Value = query_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&query_json)?);

    Ok(())
}
