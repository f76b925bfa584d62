//! Round-trip an unformatted log message through the codec and print the
//! schema the registry would store.

use std::collections::HashMap;
use std::sync::Arc;

use avrowire::{
    AvroCodec, AvroModel, FieldDescriptor, FieldValue, InMemorySchemaRegistry, ModelDescriptor,
    PrimitiveType, TypeShape,
};

struct LogMessage;

impl AvroModel for LogMessage {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(
            "demos.log_message.LogMessage",
            vec![
                FieldDescriptor::required("fmt", TypeShape::Primitive(PrimitiveType::String)),
                FieldDescriptor::required(
                    "data",
                    TypeShape::Mapping {
                        keys: Box::new(TypeShape::Primitive(PrimitiveType::String)),
                        values: Box::new(TypeShape::Primitive(PrimitiveType::String)),
                    },
                ),
            ],
        )
        .with_aliases(vec!["LogMessage".to_string()])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(InMemorySchemaRegistry::new());
    let codec = AvroCodec::for_model::<LogMessage>("logs-value", registry)?;

    println!("{}", codec.schema_json());

    let mut data = HashMap::new();
    data.insert(
        "content".to_string(),
        FieldValue::String("important content".to_string()),
    );
    let mut message = HashMap::new();
    message.insert(
        "fmt".to_string(),
        FieldValue::String("A log message with {content}.".to_string()),
    );
    message.insert("data".to_string(), FieldValue::Map(data));

    let framed = codec.encode(&message).await?;
    println!(
        "framed {} bytes under schema id {:?}",
        framed.len(),
        codec.schema_id()
    );

    let decoded = codec.decode(&framed).await?;
    println!("display {:?}", decoded.get("fmt"));
    Ok(())
}
